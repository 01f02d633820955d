//! Matrix text exports.

use std::fmt;

use super::IntMatrix;

/// Dimension line, one row per line (entries followed by a space), blank line.
impl fmt::Display for IntMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.n())?;
        for i in 0..self.n() {
            for j in 0..self.n() {
                write!(f, "{} ", self.a[(i, j)])?;
            }
            writeln!(f)?;
        }
        writeln!(f)
    }
}

impl IntMatrix {
    fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        (0..self.n()).map(move |i| (0..self.n()).map(|j| self.a[(i, j)].to_string()).collect())
    }

    /// `linalg[matrix](n,n,[a11,a12,...])`
    pub fn to_maple(&self) -> String {
        let n = self.n();
        let flat: Vec<String> = self.rows().flatten().collect();
        format!("linalg[matrix]({n},{n},[{}])\n", flat.join(","))
    }

    /// `{{a11,a12},{a21,a22}}`
    pub fn to_mathematica(&self) -> String {
        let rows: Vec<String> = self.rows().map(|r| format!("{{{}}}", r.join(","))).collect();
        format!("{{{}}}\n", rows.join(","))
    }

    /// `[a11 a12; a21 a22]`
    pub fn to_matlab(&self) -> String {
        let rows: Vec<String> = self.rows().map(|r| r.join(" ")).collect();
        format!("[{}]\n", rows.join("; "))
    }
}
