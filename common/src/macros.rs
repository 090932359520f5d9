/// Unwrap an `Option`, or evaluate the block (which must diverge) on `None`.
#[macro_export]
macro_rules! some_or_else {
    ($x:expr, $else:block) => {
        match $x {
            Some(x) => x,
            None => $else,
        }
    };
}
