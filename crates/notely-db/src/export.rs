//! CSV rendering for `GET /export_csv`.

use notely_core::{Note, Provider};

pub const CSV_HEADER: [&str; 6] = ["id", "title", "content", "tag", "type", "promptTarget"];

const LINE_END: &str = "\r\n";

/// Quote a field when it contains a delimiter, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    let row: Vec<String> = fields.into_iter().map(escape_field).collect();
    out.push_str(&row.join(","));
    out.push_str(LINE_END);
}

/// Render notes as CSV with a header row. History is not exported.
pub fn notes_to_csv(notes: &[Note]) -> String {
    let mut out = String::new();
    write_row(&mut out, CSV_HEADER);
    for note in notes {
        let id = note.id.to_string();
        write_row(
            &mut out,
            [
                id.as_str(),
                note.title.as_str(),
                note.content.as_str(),
                note.tag.as_str(),
                note.kind.as_str(),
                note.prompt_target.as_ref().map(Provider::as_str).unwrap_or(""),
            ],
        );
    }
    out
}
