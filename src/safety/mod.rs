//! Safety checks: crisis detection on user input and directive filtering on
//! generated output. Both are pure and run in-process.

pub mod crisis;
pub mod filter;

pub use crisis::{CrisisLexicon, CrisisReply, CrisisScan};
pub use filter::{BannedPhrase, FilterVerdict, MatchMode, ResponseFilter};
