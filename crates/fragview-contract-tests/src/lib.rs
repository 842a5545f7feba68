#![forbid(unsafe_code)]

//! Behavioral contracts of the preview pipeline, checked against the headless backend.


#[cfg(test)]
mod scenarios;
