//! The remote API exposed by the demo site.

use serde::{Deserialize, Serialize};

use crate::RequestMessage;

/// Ask the server to reverse a string.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ReverseString {
    pub input: String,
}

impl ReverseString {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Server answer to [`ReverseString`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Reversed {
    pub output: String,
}

impl RequestMessage for ReverseString {
    type ResponseMessage = Reversed;
}
