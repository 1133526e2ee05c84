use crate::*;
pub use path::*;
pub use random::*;
pub use sequence::*;

mod path;
mod random;
mod sequence;

pub trait BoardGenerator {
    fn generate(self, required_score: Score, params: &RoundParameters) -> Result<Board>;
}
