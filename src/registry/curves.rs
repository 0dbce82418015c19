//! Elliptic curve identifiers

use std::fmt;

/// One-byte identifier of an elliptic curve, as stored in the container header
///
/// Values outside the registry are representable so that a decoder can hold
/// whatever byte it read and reject it at the point of use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurveId(pub u8);

impl CurveId {
    /// Sentinel for "no supported curve"
    pub const INVALID: CurveId = CurveId(0);
    /// NIST P-224
    pub const P224: CurveId = CurveId(1);
    /// NIST P-256
    pub const P256: CurveId = CurveId(2);
    /// NIST P-384
    pub const P384: CurveId = CurveId(3);
    /// NIST P-521
    pub const P521: CurveId = CurveId(4);

    /// Raw header byte
    pub fn as_u8(self) -> u8 {
        self.0
    }

    /// Whether this identifier maps to a registered curve
    pub fn is_supported(self) -> bool {
        id_to_curve(self).is_some()
    }

    /// Display name, or `"unsupported"` for unknown IDs
    pub fn name(self) -> &'static str {
        id_to_curve(self).map(|c| c.name).unwrap_or("unsupported")
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of a supported curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Curve {
    pub id: CurveId,
    /// Canonical name, e.g. `P-256`
    pub name: &'static str,
    /// Size of a field element in bytes
    pub field_size: usize,
}

impl Curve {
    /// Length of a SEC1 uncompressed point (`0x04 || X || Y`)
    pub const fn uncompressed_point_len(&self) -> usize {
        1 + 2 * self.field_size
    }
}

const CURVES: [Curve; 4] = [
    Curve {
        id: CurveId::P224,
        name: "P-224",
        field_size: 28,
    },
    Curve {
        id: CurveId::P256,
        name: "P-256",
        field_size: 32,
    },
    Curve {
        id: CurveId::P384,
        name: "P-384",
        field_size: 48,
    },
    Curve {
        id: CurveId::P521,
        name: "P-521",
        field_size: 66,
    },
];

/// All registered curves in ID order
pub fn all() -> &'static [Curve] {
    &CURVES
}

/// Convert a curve name to its ID
///
/// Matching is case-insensitive and accepts both `P-256` and `P256`.
/// Returns [`CurveId::INVALID`] for anything else.
pub fn name_to_id(name: &str) -> CurveId {
    let wanted = name.trim().to_ascii_lowercase().replace('-', "");
    CURVES
        .iter()
        .find(|c| c.name.to_ascii_lowercase().replace('-', "") == wanted)
        .map(|c| c.id)
        .unwrap_or(CurveId::INVALID)
}

/// Look up the curve descriptor for an ID
pub fn id_to_curve(id: CurveId) -> Option<&'static Curve> {
    CURVES.iter().find(|c| c.id == id)
}
