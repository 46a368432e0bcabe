use arboard::Clipboard;

pub struct ClipboardService;

impl ClipboardService {
    /// Puts `text` on the system clipboard and returns it back for the
    /// status message.
    pub fn copy(text: &str) -> Result<String, String> {
        let mut clipboard = Clipboard::new().map_err(|e| e.to_string())?;
        clipboard.set_text(text.to_string()).map_err(|e| e.to_string())?;
        Ok(text.to_string())
    }
}
