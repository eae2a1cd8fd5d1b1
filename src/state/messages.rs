//! Messages exchanged between views and the controller

use serde::{Deserialize, Serialize};

/// Request sent by a view; it asks for a change, it does not make one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Intent {
    #[serde(rename = "startTimer")]
    Start {
        #[serde(rename = "timeLeft")]
        time_left: i64,
    },
    #[serde(rename = "stopTimer")]
    Stop,
    #[serde(rename = "resetTimer")]
    Reset,
}

impl Intent {
    /// Short name used for action tracking and logs
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Start { .. } => "startTimer",
            Intent::Stop => "stopTimer",
            Intent::Reset => "resetTimer",
        }
    }
}

/// Report from the controller about a change that already happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Event {
    #[serde(rename = "timerTick")]
    Tick {
        #[serde(rename = "timeLeft")]
        time_left: u32,
    },
    #[serde(rename = "timerStopped")]
    Stopped {
        #[serde(rename = "timeLeft")]
        time_left: u32,
    },
    #[serde(rename = "timerComplete")]
    Complete {
        #[serde(rename = "completedCycles")]
        completed_cycles: u64,
    },
    #[serde(rename = "timerReset")]
    Reset,
}
