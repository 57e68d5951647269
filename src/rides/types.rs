use serde::{Deserialize, Serialize};

/// One candidate ride offered to the user, entirely fabricated by the
/// generative backend. Every field is an opaque display string; ETAs and
/// prices are shown verbatim, never parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RideOption {
    /// Ride tier label, e.g. "Eco", "Comfort", "XL".
    /// Serialized as `type` on the wire; `kind` in Rust because `type` is reserved.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable arrival estimate, e.g. "4 min".
    pub eta: String,
    /// Human-readable price, e.g. "$12.50".
    pub price: String,
    /// Short marketing blurb for the option card.
    pub description: String,
    /// Human-readable passenger capacity, e.g. "1-2 passengers".
    pub capacity: String,
}
