//! What the firmware does once the console is up.

use crate::poll::Poll;
use crate::uart::UartBackend;

pub const BANNER: &str = "PowerPC to the People";

/// Print the boot banner.
pub fn announce<U: UartBackend>(console: &mut U) {
    console.puts(BANNER);
}

/// [`announce`] with an explicit wait policy.
pub fn announce_with<U, P>(console: &mut U, poll: &mut P) -> Result<(), P::Error>
where
    U: UartBackend,
    P: Poll,
{
    console.puts_with(BANNER, poll)
}
