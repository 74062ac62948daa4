/// Reassembles newline-delimited lines from text chunks of arbitrary size.
///
/// Everything after the last `'\n'` seen so far is held back until more text
/// arrives or [`LineFramer::finish`] is called.
#[derive(Debug, Default)]
pub struct LineFramer {
    container: String,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed, in arrival order.
    /// Returned lines exclude the `'\n'` terminator.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.container.push_str(chunk);

        let Some(last_newline) = self.container.rfind('\n') else {
            return Vec::new();
        };

        let remainder = self.container.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.container, remainder);
        complete[..last_newline].split('\n').map(str::to_string).collect()
    }

    /// Hand out the trailing partial line at stream end. Empty if the stream
    /// ended on a newline.
    pub fn finish(&mut self) -> String {
        std::mem::take(&mut self.container)
    }

    /// Text received but not yet terminated by a newline
    pub fn pending(&self) -> &str {
        &self.container
    }
}
