use elastic_mail::Error;

// Exit codes understood by the MTA, see sysexits.h
pub const OK: i32 = 0;
pub const UNAVAILABLE: i32 = 69;
pub const TEMPFAIL: i32 = 75;
pub const CONFIG: i32 = 78;

/// Map a failed submission to the exit code reported back to the MTA.
pub fn exit_code(err: &Error) -> i32 {
    match err {
        // The provider never saw the message; tell the MTA to
        // retry delivery to the filter later.
        Error::Transport(_) | Error::Timeout => TEMPFAIL,
        Error::Config(_) => CONFIG,
        Error::Provider(_) | Error::InvalidMessage(_) => UNAVAILABLE,
    }
}
