pub mod synthetic_trace;
