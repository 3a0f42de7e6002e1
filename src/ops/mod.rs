pub mod pipeline;
pub mod projection;
pub mod rank;
pub mod replay;
