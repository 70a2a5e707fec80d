use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoinId(pub u64);

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "coin_{}", self.0)
    }
}

/// Where the coin sits in the play area, in percent of width/height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Somewhere in 5-85% on both axes so the coin never hugs an edge.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            x: rng.gen_range(5.0..85.0),
            y: rng.gen_range(5.0..85.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinInstance {
    pub id: CoinId,
    pub type_id: String,
    pub is_flipping: bool,
    pub position: Position,
}

impl CoinInstance {
    pub fn new(id: CoinId, type_id: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            type_id: type_id.into(),
            is_flipping: false,
            position,
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.is_flipping
    }

    pub fn start_flip(&mut self) {
        self.is_flipping = true;
    }

    pub fn finish_flip(&mut self) {
        self.is_flipping = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn coin_id_displays_with_prefix() {
        assert_eq!(CoinId(7).to_string(), "coin_7");
    }

    #[test]
    fn random_positions_stay_inside_margins() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let pos = Position::random(&mut rng);
            assert!((5.0..85.0).contains(&pos.x));
            assert!((5.0..85.0).contains(&pos.y));
        }
    }

    #[test]
    fn flip_cycle_is_idle_flipping_idle() {
        let mut coin = CoinInstance::new(CoinId(1), "basic", Position { x: 10.0, y: 10.0 });
        assert!(coin.is_idle());
        coin.start_flip();
        coin.start_flip();
        assert!(coin.is_flipping);
        coin.finish_flip();
        assert!(coin.is_idle());
    }
}
