use crate::model::ReportData;

/// Render a self-contained HTML report (data embedded as JSON).
///
/// Important: we avoid `format!()` because the HTML contains many `{}` from JS
/// template literals (e.g., `${x}`), which would conflict with Rust formatting.
pub fn render_html_report(data: &ReportData) -> anyhow::Result<String> {
    // `</` inside a string would end the script element early.
    let json = serde_json::to_string(data)?.replace("</", "<\\/");

    const TEMPLATE: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Trace Run Report</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  h1 { font-size: 18px; margin: 0 0 8px 0; }
  .main { padding: 12px 16px; }

  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .muted { color: #777; font-size: 12px; }

  table { border-collapse: collapse; margin-top: 8px; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; }
  th { background: white; border-bottom: 1px solid #ddd; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
  code { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 13px; }

  .figures { display: flex; flex-wrap: wrap; gap: 16px; margin-top: 16px; }
  .figure { border: 1px solid #eee; border-radius: 6px; padding: 8px; }
  .figure svg text { font-size: 11px; fill: #333; }
  .figure .title { font-size: 13px; font-weight: 600; }
</style>
</head>
<body>
<header>
  <h1 id="title"></h1>
  <div class="summary" id="summary"></div>
</header>

<div class="main">
  <h2>Traces</h2>
  <table>
    <thead>
      <tr>
        <th>role</th>
        <th class="num">events</th>
        <th class="num">first</th>
        <th class="num">last</th>
        <th>peak</th>
        <th class="num"></th>
      </tr>
    </thead>
    <tbody id="rolesBody"></tbody>
  </table>

  <h2>Actors</h2>
  <div id="actors" class="muted"></div>

  <h2>Figures</h2>
  <div class="figures" id="figures"></div>
</div>

<script>
// Embedded report data (JSON object literal)
const DATA = __DATA__;

const COLORS = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b"];
const PX_PER_INCH = 60;

function fmt(x) {
  if (x === null || x === undefined) return "-";
  return String(Math.round(x * 1000) / 1000);
}

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function renderSummary() {
  const t = DATA.totals;
  document.getElementById("title").textContent = DATA.title || "Trace run";
  document.getElementById("summary").innerHTML = `
    <span class="pill">events: <b>${t.events}</b></span>
    <span class="pill">actors: <b>${t.actors}</b></span>
    <span class="pill">figures: <b>${t.figures}</b></span>
    <span class="pill">basetime: <b>${fmt(t.basetime)}</b></span>
  `;
}

function renderRoles() {
  const body = document.getElementById("rolesBody");
  for (const r of DATA.roles) {
    const tr = document.createElement("tr");
    tr.innerHTML = `
      <td><code>${escapeHtml(r.role)}</code></td>
      <td class="num">${r.events}</td>
      <td class="num">${fmt(r.first)}</td>
      <td class="num">${fmt(r.last)}</td>
      <td>${escapeHtml(r.peak_metric)}</td>
      <td class="num">${fmt(r.peak)}</td>
    `;
    body.appendChild(tr);
  }
}

function renderActors() {
  const el = document.getElementById("actors");
  const entries = Object.entries(DATA.actors);
  if (!entries.length) {
    el.textContent = "no actor labels configured";
    return;
  }
  el.innerHTML = entries
    .map(([id, label]) => `<code>${escapeHtml(id)}</code> = ${escapeHtml(label)}`)
    .join("<br>");
}

function extent(values) {
  let lo = Infinity, hi = -Infinity;
  for (const v of values) {
    if (v === null || !isFinite(v)) continue;
    lo = Math.min(lo, v);
    hi = Math.max(hi, v);
  }
  return lo <= hi ? [lo, hi] : [0, 1];
}

function scale(d0, d1, r0, r1) {
  const span = (d1 - d0) || 1;
  return (v) => r0 + (v - d0) / span * (r1 - r0);
}

function svgText(x, y, text, anchor, cls) {
  return `<text x="${x}" y="${y}" text-anchor="${anchor}" class="${cls || ""}">${escapeHtml(text)}</text>`;
}

function drawFigure(fig) {
  const W = fig.width * PX_PER_INCH, H = fig.height * PX_PER_INCH;
  const m = { l: 64, r: 16, t: 28, b: 40 };
  const parts = [];

  let xd, yd;
  const body = fig.body;
  if (body.kind === "histogram") {
    xd = fig.xlim || (body.edges.length ? [body.edges[0], body.edges[body.edges.length - 1]] : [0, 1]);
    yd = fig.ylim || [0, Math.max(1, ...body.counts)];
  } else {
    xd = fig.xlim || extent(body.series.flatMap((s) => s.index));
    yd = fig.ylim || extent(body.series.flatMap((s) => s.values));
  }
  const sx = scale(xd[0], xd[1], m.l, W - m.r);
  const sy = scale(yd[0], yd[1], H - m.b, m.t);

  parts.push(`<rect x="${m.l}" y="${m.t}" width="${W - m.l - m.r}" height="${H - m.t - m.b}" fill="none" stroke="#ccc"/>`);
  parts.push(svgText(W / 2, 16, fig.title, "middle", "title"));
  parts.push(svgText(m.l, H - m.b + 14, fmt(xd[0]), "start"));
  parts.push(svgText(W - m.r, H - m.b + 14, fmt(xd[1]), "end"));
  parts.push(svgText(m.l - 4, H - m.b, fmt(yd[0]), "end"));
  parts.push(svgText(m.l - 4, m.t + 10, fmt(yd[1]), "end"));
  if (fig.xlabel) parts.push(svgText(W / 2, H - 8, fig.xlabel, "middle"));

  if (body.kind === "histogram") {
    body.counts.forEach((c, i) => {
      const x0 = sx(body.edges[i]), x1 = sx(body.edges[i + 1]);
      const y = sy(c);
      parts.push(`<rect x="${x0}" y="${y}" width="${Math.max(0, x1 - x0 - 1)}" height="${Math.max(0, sy(yd[0]) - y)}" fill="${COLORS[0]}"/>`);
    });
  } else {
    body.series.forEach((s, i) => {
      const color = COLORS[i % COLORS.length];
      let d = "";
      let pen = false;
      s.index.forEach((t, j) => {
        const v = s.values[j];
        if (v === null) { pen = false; return; }
        d += `${pen ? "L" : "M"}${sx(t)},${sy(v)} `;
        pen = true;
      });
      parts.push(`<path d="${d}" fill="none" stroke="${color}" stroke-width="1.5"/>`);
      if (fig.legend) {
        const ly = m.t + 14 + i * 14;
        parts.push(`<rect x="${W - m.r - 140}" y="${ly - 8}" width="10" height="3" fill="${color}"/>`);
        parts.push(svgText(W - m.r - 126, ly, s.name, "start"));
      }
    });
  }

  const div = document.createElement("div");
  div.className = "figure";
  div.innerHTML = `<svg width="${W}" height="${H}" xmlns="http://www.w3.org/2000/svg">${parts.join("")}</svg>`;
  return div;
}

function renderFigures() {
  const root = document.getElementById("figures");
  if (!DATA.figures.length) {
    root.innerHTML = `<span class="muted">no figures</span>`;
    return;
  }
  for (const fig of DATA.figures) root.appendChild(drawFigure(fig));
}

renderSummary();
renderRoles();
renderActors();
renderFigures();
</script>
</body>
</html>
"##;

    Ok(TEMPLATE.replace("__DATA__", &json))
}
