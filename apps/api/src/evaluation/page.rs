//! Server-rendered form page: job description, PDF upload, two action buttons.

use crate::evaluation::EvaluationOutcome;

#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub job_description: &'a str,
    pub uploaded_file: Option<&'a str>,
    pub outcome: Option<&'a EvaluationOutcome>,
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>ATS Resume Expert</title>
<style>
  body { font-family: sans-serif; margin: 2rem auto; max-width: 960px; }
  textarea { width: 100%; height: 200px; }
  .notice { padding: .75rem 1rem; border-radius: 4px; margin: 1rem 0; }
  .success { background: #e6f4ea; }
  .warning { background: #fff4e5; }
  .error { background: #fdecea; }
  .response { white-space: pre-wrap; }
</style>
</head>
<body>
<h1>ATS Tracking System</h1>
"#;

/// Renders the full page. All user- and model-supplied text is escaped.
pub fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::from(PAGE_HEAD);

    html.push_str(
        r#"<form method="post" action="/" enctype="multipart/form-data">
<label for="job_description">Job Description:</label>
<textarea id="job_description" name="job_description">"#,
    );
    html.push_str(&escape_html(view.job_description));
    html.push_str(
        r#"</textarea>
<p><label for="resume">Upload your resume (PDF only)</label>
<input id="resume" type="file" name="resume" accept=".pdf,application/pdf"></p>
<button type="submit" name="action" value="evaluate">Evaluate Resume</button>
<button type="submit" name="action" value="match">Percentage Match</button>
</form>
"#,
    );

    if view.uploaded_file.is_some() {
        html.push_str("<div class=\"notice success\">Resume uploaded successfully.</div>\n");
    }

    if let Some(outcome) = view.outcome {
        html.push_str(&render_outcome(outcome));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_outcome(outcome: &EvaluationOutcome) -> String {
    match outcome {
        EvaluationOutcome::Response { heading, text } => format!(
            "<h2>{}:</h2>\n<div class=\"response\">{}</div>\n",
            escape_html(heading),
            escape_html(text)
        ),
        EvaluationOutcome::Error { message } => format!(
            "<div class=\"notice error\">{}</div>\n",
            escape_html(message)
        ),
        EvaluationOutcome::Warning { message } => format!(
            "<div class=\"notice warning\">{}</div>\n",
            escape_html(message)
        ),
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
