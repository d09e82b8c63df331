macro_rules! format_error {
    ($e:expr) => {
        return Err($crate::error::Error::Format(($e).to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::Error::Format(format!($fmt, $($arg)+)))
    };
}

macro_rules! invalid_input {
    ($e:expr) => {
        return Err($crate::error::Error::InvalidInput(($e).to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::Error::InvalidInput(format!($fmt, $($arg)+)))
    };
}

macro_rules! invalid_state {
    ($e:expr) => {
        return Err($crate::error::Error::InvalidState(($e).to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::Error::InvalidState(format!($fmt, $($arg)+)))
    };
}
