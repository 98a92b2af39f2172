pub mod process;

pub use process::{
    ProcessNumberCommand, ProcessNumberError, ProcessNumberResponse, MISSING_NUMBER_MESSAGE,
};
