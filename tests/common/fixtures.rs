//! Documents, templates and fake PDF printers shared by the integration tests.

use vitae::config::PdfConfig;

/// Lines starting with this carry the cache-busting numeral.
pub const RANDOM_LINE_PREFIX: &str = "random=";

pub const FONT_NAME: &str = "Lato-Regular.ttf";
pub const FONT_BYTES: &[u8] = b"\x00\x01\x00\x00fake-truetype";

pub const RESUME_YAML: &str = "\
name: \"Ada \u{201C}Countess\u{201D} Lovelace\"
jobs:
  - title: Analyst
    details:
      - Intro
      - Responsibilities:
          - Led team
          - Shipped X
      - Freelance
";

pub const TEMPLATES: &[(&str, &str)] = &[
    (
        "resume.html.hbs",
        "<h1>{{clean_style name}}</h1>
<p>{{docname}}</p>
{{#each jobs}}<h2>{{title}}</h2><ul>{{#each (prep_details details)}}{{#if (is_tuple this)}}<li>{{#if label}}<b>{{label}}</b>{{/if}}{{#if (is_list detail)}}{{#each detail}}<i>{{this}}</i>{{/each}}{{else}}{{detail}}{{/if}}</li>{{else}}<li>{{this}}</li>{{/if}}{{/each}}</ul>{{/each}}
random={{random}}
",
    ),
    (
        "resume.txt.hbs",
        "{{name}}|{{indent_incr}}|{{bullet_char}}|{{prevent_breaks}}|{{url_query_str}}|{{url_query.tag}}",
    ),
    ("resume.css.hbs", "h1 { margin-left: {{indent_incr}}em; }"),
];

fn sh(script: &str, extra: &[&str]) -> PdfConfig {
    let mut args = vec!["-c".to_string(), script.to_string()];
    args.extend(extra.iter().map(|s| s.to_string()));
    PdfConfig {
        program: "sh".to_string(),
        args,
    }
}

/// Writes a tiny "PDF" naming the URL it was asked to print.
pub fn fake_printer() -> PdfConfig {
    sh("printf '%%PDF-1.4 %s' \"$0\" > \"$1\"", &["{url}", "{output}"])
}

/// Exits nonzero after complaining on stderr.
pub fn failing_printer() -> PdfConfig {
    sh("echo boom >&2; exit 3", &["{url}", "{output}"])
}

/// Exits cleanly without writing anything.
pub fn silent_printer() -> PdfConfig {
    sh("true", &["{url}", "{output}"])
}

/// A program that does not exist.
pub fn missing_printer() -> PdfConfig {
    PdfConfig {
        program: "vitae-no-such-pdf-printer".to_string(),
        args: vec!["{url}".to_string(), "{output}".to_string()],
    }
}
