//! Short channel handles for selecting channels on the command line.
//!
//! A handle is the channel name with its bracketed unit suffix, spaces and
//! case removed: `Abs Speed[cm/s]` becomes `absspeed`.

use crate::DecodedChannel;

/// Handle that selects every channel.
pub const ALL_CHANNELS: &str = "all";

/// Derive the handle for a channel name.
///
/// Everything from the first `[` to the last `]` is dropped.
///
/// # Examples
/// ```
/// use bmdecode_core::channels::channel_handle;
///
/// assert_eq!(channel_handle("Abs Speed[cm/s]"), "absspeed");
/// assert_eq!(channel_handle("Temperature[ºC] or Pressure[dbar]"), "temperature");
/// assert_eq!(channel_handle("Ping Count"), "pingcount");
/// ```
pub fn channel_handle(name: &str) -> String {
    let stripped = match (name.find('['), name.rfind(']')) {
        (Some(open), Some(close)) if open < close => {
            format!("{}{}", &name[..open], &name[close + 1..])
        }
        _ => name.to_string(),
    };
    stripped.replace(' ', "").to_lowercase()
}

/// (handle, channel name) pairs for a channel list, in list order.
pub fn channel_handles<S: AsRef<str>>(channels: &[S]) -> Vec<(String, String)> {
    channels
        .iter()
        .map(|channel| (channel_handle(channel.as_ref()), channel.as_ref().to_string()))
        .collect()
}

/// Resolve requested handles to channel names, in channel-list order.
///
/// `all` selects every channel. Unknown handles are ignored.
///
/// # Examples
/// ```
/// use bmdecode_core::channels::{channel_handles, select_channels};
///
/// let handles = channel_handles(&["Abs Speed[cm/s]", "Ping Count"]);
/// assert_eq!(select_channels(&["pingcount"], &handles), ["Ping Count"]);
/// assert_eq!(select_channels(&["all"], &handles).len(), 2);
/// ```
pub fn select_channels<S: AsRef<str>>(requested: &[S], handles: &[(String, String)]) -> Vec<String> {
    let wants = |handle: &str| requested.iter().any(|r| r.as_ref() == handle);
    if wants(ALL_CHANNELS) {
        return handles.iter().map(|(_, name)| name.clone()).collect();
    }
    handles
        .iter()
        .filter(|(handle, _)| wants(handle.as_str()))
        .map(|(_, name)| name.clone())
        .collect()
}

/// Keep only decoded channels whose name is in `selected`.
pub fn retain_channels(decoded: &mut Vec<DecodedChannel>, selected: &[String]) {
    decoded.retain(|channel| selected.iter().any(|name| *name == channel.channel_name));
}
