use crate::config::Settings;
use crate::stats::human_size;

const TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Universal Document Reader</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 2rem auto; max-width: 1100px; color: #1d1d1f; }
    h1 { margin-bottom: 0.25rem; }
    .card { border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
    .info { background: #eef5ff; padding: 0.75rem; border-radius: 6px; }
    .error { background: #fdecea; color: #8a1c14; padding: 0.75rem; border-radius: 6px; margin-bottom: 1rem; }
    details { border: 1px solid #ddd; border-radius: 8px; margin-bottom: 1rem; padding: 0.5rem 1rem; }
    summary { font-weight: 600; cursor: pointer; }
    textarea { width: 100%; height: 350px; font-family: monospace; margin-top: 0.5rem; }
    .stats { color: #555; font-size: 0.9rem; margin: 0.5rem 0; }
    button { margin: 0.5rem 0.5rem 0 0; padding: 0.5rem 1rem; }
    hr { margin: 1.5rem 0; }
  </style>
</head>
<body>
  <h1>📝 Universal Document-to-Text Converter</h1>
  <p>Upload Office documents, PDFs, or HTML files to convert them into clean, LLM-ready Markdown text.</p>

  <div class="card">
    <label for="files">Choose files ({{ACCEPT_LABEL}}, up to {{MAX_FILE}} each)</label><br />
    <input id="files" type="file" multiple accept="{{ACCEPT}}" />
    <button id="convertBtn">Convert</button>
    <div id="status"></div>
  </div>

  <div id="results"><div class="info">Please upload one or more documents to begin.</div></div>

  <script>
    const filesInput = document.getElementById('files');
    const convertBtn = document.getElementById('convertBtn');
    const statusBox = document.getElementById('status');
    const results = document.getElementById('results');

    function download(content, fileName, mime) {
      const blob = new Blob([content], { type: mime + ';charset=utf-8' });
      const url = URL.createObjectURL(blob);
      const a = document.createElement('a');
      a.href = url;
      a.download = fileName;
      document.body.appendChild(a);
      a.click();
      a.remove();
      URL.revokeObjectURL(url);
    }

    function renderResult(report) {
      if (report.status !== 'converted') {
        const box = document.createElement('div');
        box.className = 'error';
        box.textContent = '⚠️ ' + report.message;
        return box;
      }
      const details = document.createElement('details');
      details.open = true;
      const summary = document.createElement('summary');
      summary.textContent = '✅ ' + report.file_name;
      details.appendChild(summary);

      const stats = document.createElement('div');
      stats.className = 'stats';
      stats.textContent = report.stats.summary;
      details.appendChild(stats);

      const preview = document.createElement('textarea');
      preview.readOnly = true;
      preview.setAttribute('aria-label', 'Extracted Content Preview');
      preview.value = report.markdown;
      details.appendChild(preview);

      for (const exp of report.exports) {
        const btn = document.createElement('button');
        btn.textContent = '📥 ' + exp.label;
        btn.addEventListener('click', () => download(report.markdown, exp.file_name, exp.mime_type));
        details.appendChild(btn);
      }
      return details;
    }

    convertBtn.addEventListener('click', async () => {
      results.replaceChildren();
      if (!filesInput.files.length) {
        const info = document.createElement('div');
        info.className = 'info';
        info.textContent = 'Please upload one or more documents to begin.';
        results.appendChild(info);
        return;
      }
      const formData = new FormData();
      for (const file of filesInput.files) {
        formData.append('files', file, file.name);
      }
      convertBtn.disabled = true;
      statusBox.textContent = 'Processing ' + filesInput.files.length + ' file(s)...';
      try {
        const res = await fetch('/api/convert', { method: 'POST', body: formData });
        const isJson = (res.headers.get('content-type') || '').includes('application/json');
        const json = isJson ? await res.json() : null;
        if (!res.ok || !json) {
          const reason = res.status === 413 ? 'the upload is too large' : 'status ' + res.status;
          statusBox.textContent = (json && json.error) || ('Request failed: ' + reason);
          return;
        }
        results.appendChild(document.createElement('hr'));
        for (const report of json.results) {
          results.appendChild(renderResult(report));
        }
        statusBox.textContent = json.converted + ' converted, ' + json.failed + ' failed. Total: ' + json.totals.summary;
      } catch (err) {
        statusBox.textContent = 'Request failed: ' + err;
      } finally {
        convertBtn.disabled = false;
      }
    });
  </script>
</body>
</html>
"#;

/// The upload page, with the accept list and size limit filled in.
/// Extensions are validated as ASCII alphanumerics when settings load, so
/// they need no escaping here.
pub fn render(settings: &Settings) -> String {
    let extensions = &settings.upload.allowed_extensions;
    let accept = extensions
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",");
    let accept_label = extensions
        .iter()
        .map(|ext| ext.to_uppercase())
        .collect::<Vec<_>>()
        .join(", ");

    TEMPLATE
        .replace("{{ACCEPT}}", &accept)
        .replace("{{ACCEPT_LABEL}}", &accept_label)
        .replace("{{MAX_FILE}}", &human_size(settings.upload.max_file_bytes as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_in_accept_list_and_limit() {
        let settings = Settings::builtin().unwrap();
        let html = render(&settings);
        assert!(html.contains(r#"accept=".docx,.xlsx,.pptx,.pdf,.html,.htm,.zip""#));
        assert!(html.contains("DOCX, XLSX, PPTX, PDF, HTML, HTM, ZIP"));
        assert!(html.contains("up to 50.0 MB each"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn error_responses_are_checked_before_parsing() {
        let html = render(&Settings::builtin().unwrap());
        let check = html.find("res.headers.get('content-type')").unwrap();
        let parse = html.find("await res.json()").unwrap();
        assert!(check < parse);
    }
}
