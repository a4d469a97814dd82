pub const SUCCESS: i32 = 0;
/// Bad arguments, unknown mode, or a run that could not start.
pub const FAILURE: i32 = 1;
