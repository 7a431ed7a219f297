mod company;
mod problem;
mod progress;
mod timeframe;

pub use company::CompanyProblems;
pub use problem::{Difficulty, Problem};
pub use progress::{
    ParseStatusError, ProblemStatus, ProgressDraft, ProgressRecord, StatusCounts,
};
pub use timeframe::Timeframe;
