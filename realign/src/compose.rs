use std::{
    fmt::{self, Display},
    fs,
    path::Path,
};

use nalgebra::Vector3;
use tracing::info;

use crate::error::{RealignError, Result};

/// Directives written ahead of the filtered toolpath, read back by the
/// non-planar reprint stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Header<'a> {
    pub offset: Vector3<f64>,
    pub layer_height: f64,
    pub provenance: &'a str,
    /// Terminator for the header lines, matching the toolpath's.
    pub newline: &'a str,
}

impl Display for Header<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, z) = (self.offset.x, self.offset.y, self.offset.z);
        let nl = self.newline;
        write!(f, "o X {x:.6} Y {y:.6} Z {z:.6}{nl}")?;
        // Debug keeps a trailing `.0` on whole numbers.
        write!(f, "t {:?}{nl}", self.layer_height)?;
        write!(f, "; {}{nl}", self.provenance)?;
        write!(f, ";{nl}")
    }
}

pub fn compose(header: &Header, lines: &[&str]) -> String {
    let header = header.to_string();
    let body = lines.iter().map(|line| line.len()).sum::<usize>();

    let mut out = String::with_capacity(header.len() + body);
    out.push_str(&header);
    lines.iter().for_each(|line| out.push_str(line));
    out
}

/// Writes the composed document in one go, nothing touches `path` until the
/// whole output exists in memory.
pub fn write_output(path: &Path, header: &Header, lines: &[&str]) -> Result<()> {
    fs::write(path, compose(header, lines)).map_err(|source| RealignError::Io {
        path: path.to_owned(),
        source,
    })?;
    info!("Done! Output: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let header = Header {
            offset: Vector3::new(-5.0, 12.3456789, 0.0),
            layer_height: 0.3,
            provenance: "Converted from Cura (skirt/brim removed)",
            newline: "\n",
        };

        assert_eq!(
            header.to_string(),
            "o X -5.000000 Y 12.345679 Z 0.000000\nt 0.3\n; Converted from Cura (skirt/brim removed)\n;\n"
        );
    }

    #[test]
    fn whole_layer_height_keeps_fraction() {
        let header = Header {
            offset: Vector3::zeros(),
            layer_height: 1.0,
            provenance: "x",
            newline: "\n",
        };
        assert!(header.to_string().contains("\nt 1.0\n"));
    }

    #[test]
    fn body_follows_header_verbatim() {
        let header = Header {
            offset: Vector3::zeros(),
            layer_height: 0.2,
            provenance: "p",
            newline: "\n",
        };
        let out = compose(&header, &[";LAYER:0\r\n", "  G1 X1  \n", "G1 X2"]);
        assert!(out.ends_with(";\n;LAYER:0\r\n  G1 X1  \nG1 X2"));
        assert_eq!(out.lines().count(), 7);
    }

    #[test]
    fn crlf_header() {
        let header = Header {
            offset: Vector3::new(1.0, 2.0, 3.0),
            layer_height: 0.2,
            provenance: "p",
            newline: "\r\n",
        };
        let out = compose(&header, &[";LAYER:0\r\n", "G1 X1\r\n"]);
        assert_eq!(
            out,
            "o X 1.000000 Y 2.000000 Z 3.000000\r\nt 0.2\r\n; p\r\n;\r\n;LAYER:0\r\nG1 X1\r\n"
        );
    }

    #[test]
    fn tiny_layer_height_uses_exponent() {
        let header = Header {
            offset: Vector3::zeros(),
            layer_height: 0.00001,
            provenance: "p",
            newline: "\n",
        };
        assert!(header.to_string().contains("\nt 1e-5\n"));
    }
}
