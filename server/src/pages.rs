//! HTML for `/` and `/details`.

use std::collections::BTreeMap;

use serde_json::Value;
use tts_core::ModelCapabilities;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n\
         <style>body{{font-family:sans-serif;max-width:48rem;margin:2rem auto}}\
         textarea{{width:100%}}table{{border-collapse:collapse}}\
         td,th{{border:1px solid #ccc;padding:.25rem .5rem;text-align:left;vertical-align:top}}</style>\n\
         </head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

fn select(id: &str, label: &str, ids: &BTreeMap<String, i64>) -> String {
    let mut html = format!("<label for=\"{id}\">{label}</label>\n<select id=\"{id}\">\n");
    for name in ids.keys() {
        let name = escape_html(name);
        html.push_str(&format!("<option value=\"{name}\">{name}</option>\n"));
    }
    html.push_str("</select>\n");
    html
}

const INDEX_SCRIPT: &str = r#"<script>
function speak() {
  const params = new URLSearchParams({ text: document.getElementById("text").value });
  for (const [id, key] of [["speaker_id", "speaker_id"], ["language_id", "language_id"], ["style_wav", "style_wav"]]) {
    const el = document.getElementById(id);
    if (el && el.value) params.set(key, el.value);
  }
  const btn = document.getElementById("speak-button");
  btn.disabled = true;
  fetch("/api/tts?" + params.toString(), { cache: "no-cache" })
    .then(res => { if (!res.ok) throw Error(res.statusText); return res.blob(); })
    .then(blob => { const audio = document.getElementById("audio"); audio.src = URL.createObjectURL(blob); audio.play(); })
    .catch(err => alert(err))
    .finally(() => { btn.disabled = false; });
}
</script>"#;

/// Landing page: a text box wired to `/api/tts` plus whatever selectors the model supports.
pub fn render_index(show_details: bool, caps: &ModelCapabilities) -> String {
    let mut body = String::from("<h1>Text to speech</h1>\n");

    if show_details {
        body.push_str("<p><a href=\"/details\">Model details</a></p>\n");
    }

    body.push_str("<textarea id=\"text\" rows=\"4\" placeholder=\"Type here...\"></textarea>\n<p>\n");

    if caps.multi_speaker {
        if let Some(ids) = &caps.speaker_ids {
            body.push_str(&select("speaker_id", "Speaker", ids));
        }
    }
    if caps.multi_language {
        if let Some(ids) = &caps.language_ids {
            body.push_str(&select("language_id", "Language", ids));
        }
    }
    if caps.use_gst {
        body.push_str(
            "<label for=\"style_wav\">Style wav</label>\n\
             <input id=\"style_wav\" type=\"text\" placeholder=\"path or GST token weights\">\n",
        );
    }

    body.push_str("</p>\n<button id=\"speak-button\" onclick=\"speak()\">Speak</button>\n");
    body.push_str("<p><audio id=\"audio\" controls></audio></p>\n");
    body.push_str(INDEX_SCRIPT);

    page("TTS server", &body)
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => escape_html(s),
        Value::Null => String::from("<em>none</em>"),
        other => escape_html(&other.to_string()),
    }
}

fn table(title: &str, value: &Value) -> String {
    let mut html = format!("<h2>{}</h2>\n<table>\n", escape_html(title));
    match value.as_object() {
        Some(obj) => {
            for (key, v) in obj {
                html.push_str(&format!(
                    "<tr><th>{}</th><td>{}</td></tr>\n",
                    escape_html(key),
                    cell(v)
                ));
            }
        }
        None => html.push_str(&format!("<tr><td>{}</td></tr>\n", cell(value))),
    }
    html.push_str("</table>\n");
    html
}

/// Dump of the model config, vocoder config and startup arguments.
pub fn render_details(
    show_details: bool,
    model_config: Option<&Value>,
    vocoder_config: Option<&Value>,
    args: &Value,
) -> String {
    let mut body = String::from("<h1>Model details</h1>\n");
    if !show_details {
        body.push_str("<p>Start the server with <code>--show_details true</code> to link this page from the index.</p>\n");
    }
    match model_config {
        Some(cfg) => body.push_str(&table("Model config", cfg)),
        None => body.push_str("<h2>Model config</h2>\n<p>not available</p>\n"),
    }
    if let Some(cfg) = vocoder_config {
        body.push_str(&table("Vocoder config", cfg));
    }
    body.push_str(&table("Arguments", args));
    page("TTS server - details", &body)
}
