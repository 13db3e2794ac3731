// Job postings and candidate applications.

pub mod handlers;
