use crate::domain::HistoryLog;

pub struct HistoryExporter;

impl HistoryExporter {
    /// Writes the history as CSV with a `formula,result` header, oldest
    /// entry first. Returns the file name written.
    pub fn export_to_csv(history: &HistoryLog, filename: &str) -> Result<String, String> {
        let mut writer = csv::Writer::from_path(filename).map_err(|e| e.to_string())?;

        writer.write_record(["formula", "result"]).map_err(|e| e.to_string())?;
        for entry in history.entries() {
            writer
                .write_record([entry.formula_name.as_str(), entry.result.as_str()])
                .map_err(|e| e.to_string())?;
        }
        writer.flush().map_err(|e| e.to_string())?;

        Ok(filename.to_string())
    }
}
