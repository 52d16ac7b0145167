//! Quality tiers and their display attributes

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered move quality tiers, best first.
///
/// `Great` is reserved for presentation parity and is never produced by the
/// base classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Brilliant,
    Great,
    Book,
    Best,
    Excellent,
    Good,
    Miss,
    Inaccuracy,
    Mistake,
    Blunder,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Brilliant => "Brilliant",
            Tier::Great => "Great",
            Tier::Book => "Book",
            Tier::Best => "Best",
            Tier::Excellent => "Excellent",
            Tier::Good => "Good",
            Tier::Miss => "Miss",
            Tier::Inaccuracy => "Inaccuracy",
            Tier::Mistake => "Mistake",
            Tier::Blunder => "Blunder",
        }
    }

    /// Display color token, fixed for UI compatibility.
    pub fn color(&self) -> &'static str {
        match self {
            Tier::Brilliant => "#1baca6",
            Tier::Great => "#5c8bb0",
            Tier::Book => "#a88865",
            Tier::Best => "#9bc02a",
            Tier::Excellent => "#96bc4b",
            Tier::Good => "#96af8b",
            Tier::Miss => "#ffa500",
            Tier::Inaccuracy => "#f0c15c",
            Tier::Mistake => "#e58f2a",
            Tier::Blunder => "#fa412d",
        }
    }

    /// True for tiers that represent strong play.
    pub fn is_good(&self) -> bool {
        matches!(
            self,
            Tier::Brilliant | Tier::Great | Tier::Book | Tier::Best
        )
    }

    /// True for tiers that represent an outright error.
    pub fn is_bad(&self) -> bool {
        matches!(
            self,
            Tier::Miss | Tier::Inaccuracy | Tier::Mistake | Tier::Blunder
        )
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tier plus the centipawn loss that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub tier: Tier,
    pub label: &'static str,
    pub color: &'static str,
    pub cp_loss: i32,
}

impl Classification {
    pub fn new(tier: Tier, cp_loss: i32) -> Self {
        Classification {
            tier,
            label: tier.label(),
            color: tier.color(),
            cp_loss,
        }
    }
}
