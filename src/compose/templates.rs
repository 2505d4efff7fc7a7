//! HTML fragments for assembled messages
//!
//! Templates end in `.html` so tera escapes every interpolated value. URLs
//! are attribute-escaped before rendering and marked `safe`.

pub(super) const MESSAGE: &str = "message.html";
pub(super) const SIGNATURE: &str = "signature.html";
pub(super) const FOOTER: &str = "footer.html";
pub(super) const PIXEL: &str = "pixel.html";

pub(super) const MESSAGE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
body { font-family: Inter, -apple-system, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; line-height: 1.7; color: #1f2937; max-width: 640px; margin: 0 auto; padding: 20px; background-color: #ffffff; }
.resources { margin: 28px 0 20px 0; padding: 20px; background: #f5f7fa; border-radius: 10px; border: 1px solid #e1e4e8; }
.resources-title { font-size: 13px; font-weight: 600; color: #6b7280; text-transform: uppercase; letter-spacing: 0.5px; margin: 0 0 12px 0; }
</style>
</head>
<body>
{% for paragraph in paragraphs -%}
<p style="margin: 0 0 16px 0; font-size: 15px; color: #1f2937;">{{ paragraph }}</p>
{% endfor -%}
{% if resources %}<div class="resources">
<p class="resources-title">Resources</p>
<table role="presentation" width="100%" cellspacing="0" cellpadding="0" border="0">
{% for resource in resources -%}
<tr><td style="padding:6px;"><a href="{{ resource.url | safe }}" style="display:block; text-decoration:none; text-align:center; padding:10px 12px; border-radius:12px; background:{{ resource.color }}; color:#f8fafc; font-size:14px; font-weight:700;">{{ resource.label }}</a></td></tr>
{% endfor -%}
</table>
</div>
{% endif -%}
</body>
</html>"#;

pub(super) const SIGNATURE_HTML: &str = r#"<table cellpadding="0" cellspacing="0" border="0" class="signature-table" style="font-family: 'Segoe UI', Tahoma, Verdana, sans-serif; margin-top: 32px; max-width: 400px; border-radius: 16px; border: 2px solid rgba(245, 64, 41, 0.2);">
<tr><td style="padding: 24px;">
<p style="margin: 0; font-size: 22px; color: #f54029; font-weight: 700;">{{ sender.name }}</p>
<p style="margin: 4px 0; font-size: 15px; color: #c2410c; font-weight: 600;">{{ sender.title }}</p>
<p style="margin: 0 0 8px 0; font-size: 14px; color: #5a6c7d;">{{ company.name }}</p>
<p style="margin: 0; font-size: 13px; color: #6a7c8d;">{{ sender.city }}, {{ sender.state }}</p>
</td></tr>
</table>
"#;

pub(super) const FOOTER_HTML: &str = r#"<div style="margin-top:24px; padding-top:12px; border-top:1px solid #e5e7eb; font-size:12px; color:#6b7280;">
<p style="margin:0 0 6px 0;">{{ unsubscribe }}</p>
<p style="margin:0 0 6px 0;">{{ company.name }}<br>{{ company.address }}<br>{{ company.city_state_zip }}</p>
<p style="margin:0; font-size:11px; color:#9ca3af;">Ref: {{ marker }}</p>
</div>
"#;

pub(super) const PIXEL_HTML: &str = r#"<img src="{{ src | safe }}" width="1" height="1" style="display:block; max-width:1px; max-height:1px; border:0; opacity:0;" alt="">
"#;
