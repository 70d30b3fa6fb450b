//! Short-form address handling.
//!
//! `:9001` (host omitted) means every interface when listening and the
//! local host when dialing. Registry entries keep the string as announced.

use std::borrow::Cow;

pub fn listen_target(addr: &str) -> Cow<'_, str> {
    with_default_host(addr, "0.0.0.0")
}

pub fn dial_target(addr: &str) -> Cow<'_, str> {
    with_default_host(addr, "127.0.0.1")
}

fn with_default_host<'a>(addr: &'a str, host: &str) -> Cow<'a, str> {
    if addr.starts_with(':') {
        Cow::Owned(format!("{host}{addr}"))
    } else {
        Cow::Borrowed(addr)
    }
}
