//! Deterministic template synthesis.
//!
//! Every action maps to a body fragment. A fragment lists the standard
//! packages and capability modules it calls, and the import block is built
//! from exactly those, sorted, so the emitted program has no unused imports.

use super::{SynthesisRequest, SynthesisStrategy};
use crate::intent::TIMEOUT_PARAM;
use async_trait::async_trait;
use genie_config::BuildConfig;
use genie_core::error::ProviderError;
use genie_core::{Action, Intent, Target};
use std::collections::BTreeSet;
use std::fmt::Write;

const DEFAULT_WAIT_MS: &str = "5000";

/// Keywords delimiting an inferable button label, per language.
const CLICK_WORDS: &[&str] = &["点击", "click"];
const BUTTON_WORDS: &[&str] = &["按钮", "button"];

#[derive(Debug, Clone)]
pub struct TemplateStrategy {
    import_root: String,
}

impl Default for TemplateStrategy {
    fn default() -> Self {
        Self::new(BuildConfig::default().import_root)
    }
}

/// A body plus the imports it needs.
#[derive(Debug, Default)]
struct Fragment {
    body: String,
    std: BTreeSet<&'static str>,
    modules: BTreeSet<&'static str>,
}

impl Fragment {
    fn comment(text: &str) -> Self {
        let mut fragment = Self::default();
        fragment.line(1, &format!("// {text}"));
        fragment
    }

    fn uses(mut self, modules: &[&'static str]) -> Self {
        self.modules.extend(modules);
        self
    }

    fn uses_std(mut self, packages: &[&'static str]) -> Self {
        self.std.extend(packages);
        self
    }

    fn line(&mut self, indent: usize, text: &str) -> &mut Self {
        for _ in 0..indent {
            self.body.push('\t');
        }
        self.body.push_str(text);
        self.body.push('\n');
        self
    }
}

impl TemplateStrategy {
    /// `import_root` prefixes every capability module import path.
    pub fn new(import_root: impl Into<String>) -> Self {
        let import_root = import_root.into();
        Self {
            import_root: import_root.trim_end_matches('/').to_string(),
        }
    }

    pub fn name(&self) -> &str {
        "template"
    }

    /// Assemble a complete program for the request.
    pub fn render(&self, request: &SynthesisRequest<'_>) -> String {
        let fragment = body_for(request.intent, request.query);
        self.assemble(fragment)
    }

    fn assemble(&self, fragment: Fragment) -> String {
        let mut std = fragment.std;
        std.insert("fmt");

        let mut code = String::from("package main\n\nimport (\n");
        for package in &std {
            let _ = writeln!(code, "\t\"{package}\"");
        }
        if !fragment.modules.is_empty() {
            code.push('\n');
            for module in &fragment.modules {
                let _ = writeln!(code, "\t\"{}/{module}\"", self.import_root);
            }
        }
        code.push_str(")\n\nfunc main() {\n");
        code.push_str("\tfmt.Println(\"Starting automated test...\")\n\n");
        code.push_str(&fragment.body);
        code.push_str("\tfmt.Println(\"Test finished\")\n}\n");
        code
    }
}

#[async_trait]
impl SynthesisStrategy for TemplateStrategy {
    fn name(&self) -> &str {
        TemplateStrategy::name(self)
    }

    async fn synthesize(&self, request: &SynthesisRequest<'_>) -> Result<String, ProviderError> {
        Ok(self.render(request))
    }
}

fn body_for(intent: &Intent, query: &str) -> Fragment {
    match intent.action {
        Action::Click => click(intent, query),
        Action::Input => input(intent),
        Action::Assert => assert(intent),
        Action::Wait => wait(intent),
        Action::Launch => launch(intent),
        Action::Swipe => swipe(),
        Action::Unknown => Fragment::comment("Unrecognized action; nothing to generate"),
    }
}

/// Go string literal for `value`.
fn go_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Label between the click keyword and the button keyword, e.g. `点击登录按钮` → `登录`.
fn infer_button_label(query: &str) -> Option<String> {
    // ASCII lowering keeps byte offsets valid for slicing the original text
    let lower = query.to_ascii_lowercase();
    let (click_at, click_len) = CLICK_WORDS
        .iter()
        .find_map(|w| lower.find(w).map(|i| (i, w.len())))?;
    let start = click_at + click_len;
    let end = BUTTON_WORDS
        .iter()
        .filter_map(|w| lower[start..].find(w).map(|i| start + i))
        .min()?;

    let label = strip_article(query[start..end].trim());
    (!label.is_empty()).then(|| label.to_string())
}

/// Drop a leading English "the" when it is a whole word.
fn strip_article(label: &str) -> &str {
    match label.get(..3) {
        Some(head) if head.eq_ignore_ascii_case("the") => {
            let rest = &label[3..];
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                rest.trim_start()
            } else {
                label
            }
        }
        _ => label,
    }
}

fn click(intent: &Intent, query: &str) -> Fragment {
    let value = intent.value_str();
    match intent.target {
        Target::Coordinate => {
            let mut f = Fragment::default().uses(&["motion"]);
            f.line(1, "// Tap at the given coordinate")
                .line(1, &format!("motion.Click{}", coordinate_args(value)));
            f
        }
        Target::Button => {
            let label = if intent.has_value() {
                Some(value.to_string())
            } else {
                infer_button_label(query)
            };
            let Some(label) = label else {
                return Fragment::comment("Click target not specified; fill in a selector");
            };
            let mut f = Fragment::default().uses(&["uiacc"]);
            f.line(1, "// Find the button by text and click it")
                .line(1, &format!("obj := uiacc.New().Text({}).FindOnce()", go_str(&label)))
                .line(1, "if obj != nil {")
                .line(2, "obj.Click()")
                .line(2, "fmt.Println(\"Click succeeded\")")
                .line(1, "} else {")
                .line(2, "fmt.Println(\"Button not found\")")
                .line(1, "}");
            f
        }
        Target::Image if intent.has_value() => {
            let mut f = Fragment::default()
                .uses(&["motion", "opencv"])
                .uses_std(&["os"]);
            f.line(1, "// Locate the template image and click it");
            read_template(&mut f, value);
            f.line(1, "x, y := opencv.FindImage(0, 0, 0, 0, &templateBytes, false, 1.0, 0.8)")
                .line(1, "if x != -1 && y != -1 {")
                .line(2, "motion.Click(x, y, 1)")
                .line(2, "fmt.Printf(\"Found and clicked at (%d, %d)\\n\", x, y)")
                .line(1, "} else {")
                .line(2, "fmt.Println(\"Target image not found\")")
                .line(1, "}");
            f
        }
        _ => Fragment::comment("Click target not specified; fill in a selector"),
    }
}

/// `(100,200)` → `(100,200, 1)`. Text around the parentheses is dropped,
/// so `点击(100,200)` gives the same call.
fn coordinate_args(value: &str) -> String {
    let Some(open) = value.find('(') else {
        return format!("({value}, 1)");
    };
    let rest = &value[open..];
    let inner = rest.find(')').map_or(rest, |close| &rest[..close]);
    format!("{inner}, 1)")
}

fn read_template(f: &mut Fragment, path: &str) {
    f.line(1, &format!("templateBytes, err := os.ReadFile({})", go_str(path)))
        .line(1, "if err != nil {")
        .line(2, "fmt.Printf(\"Failed to read template: %v\\n\", err)")
        .line(2, "return")
        .line(1, "}");
}

fn input(intent: &Intent) -> Fragment {
    if !intent.has_value() {
        return Fragment::comment("Input text not specified");
    }
    let text = go_str(intent.value_str());
    if intent.target == Target::Input {
        let mut f = Fragment::default().uses(&["uiacc"]);
        f.line(1, "// Find the first editable field and type into it")
            .line(1, "inputObj := uiacc.New().Editable(true).FindOnce()")
            .line(1, "if inputObj != nil {")
            .line(2, &format!("inputObj.SetText({text})"))
            .line(2, "fmt.Println(\"Input succeeded\")")
            .line(1, "} else {")
            .line(2, "fmt.Println(\"Input field not found\")")
            .line(1, "}");
        f
    } else {
        let mut f = Fragment::default().uses(&["ime"]);
        f.line(1, "// Type through the input method")
            .line(1, &format!("ime.InputText({text})"));
        f
    }
}

fn assert(intent: &Intent) -> Fragment {
    let value = intent.value_str();
    match intent.target {
        Target::Text if intent.has_value() => {
            let mut f = Fragment::default()
                .uses(&["images", "ppocr"])
                .uses_std(&["strings"]);
            f.line(1, "// Verify the text is on screen")
                .line(1, "img := images.CaptureScreen(0, 0, 0, 0)")
                .line(1, "results := ppocr.OcrFromImage(img, \"\")")
                .line(1, "found := false")
                .line(1, "for _, result := range results {")
                .line(2, &format!("if strings.Contains(result.Label, {}) {{", go_str(value)))
                .line(3, "found = true")
                .line(3, "fmt.Printf(\"Found text: %s\\n\", result.Label)")
                .line(3, "break")
                .line(2, "}")
                .line(1, "}")
                .line(1, "if found {")
                .line(2, "fmt.Println(\"PASS: text present\")")
                .line(1, "} else {")
                .line(2, "fmt.Println(\"FAIL: text not present\")")
                .line(1, "}");
            f
        }
        Target::Image if intent.has_value() => {
            let mut f = Fragment::default().uses(&["opencv"]).uses_std(&["os"]);
            f.line(1, "// Verify the template image is on screen");
            read_template(&mut f, value);
            f.line(1, "x, y := opencv.FindImage(0, 0, 0, 0, &templateBytes, false, 1.0, 0.8)")
                .line(1, "if x != -1 && y != -1 {")
                .line(2, "fmt.Printf(\"PASS: image present at (%d, %d)\\n\", x, y)")
                .line(1, "} else {")
                .line(2, "fmt.Println(\"FAIL: image not present\")")
                .line(1, "}");
            f
        }
        _ => Fragment::comment("Assertion subject not specified"),
    }
}

fn wait(intent: &Intent) -> Fragment {
    let timeout = intent
        .parameters
        .get(TIMEOUT_PARAM)
        .map(String::as_str)
        .unwrap_or(DEFAULT_WAIT_MS);

    if intent.has_value() {
        let mut f = Fragment::default().uses(&["uiacc"]);
        f.line(1, "// Wait for the element to appear")
            .line(
                1,
                &format!(
                    "obj := uiacc.New().Text({}).WaitFor({timeout})",
                    go_str(intent.value_str())
                ),
            )
            .line(1, "if obj != nil {")
            .line(2, "fmt.Println(\"Element appeared\")")
            .line(1, "} else {")
            .line(2, "fmt.Println(\"Timed out waiting for element\")")
            .line(1, "}");
        f
    } else {
        let mut f = Fragment::default().uses(&["utils"]);
        f.line(1, &format!("// Sleep for {timeout} ms"))
            .line(1, &format!("utils.Sleep({timeout})"));
        f
    }
}

fn launch(intent: &Intent) -> Fragment {
    if !intent.has_value() {
        return Fragment::comment("Package name not specified");
    }
    let mut f = Fragment::default().uses(&["app", "utils"]);
    f.line(1, "// Launch the application")
        .line(1, &format!("if app.Launch({}, 0) {{", go_str(intent.value_str())))
        .line(2, "fmt.Println(\"App launched\")")
        .line(2, "utils.Sleep(2000)")
        .line(1, "} else {")
        .line(2, "fmt.Println(\"App launch failed\")")
        .line(2, "return")
        .line(1, "}");
    f
}

fn swipe() -> Fragment {
    let mut f = Fragment::default().uses(&["motion"]);
    f.line(1, "// Example swipe; adjust the coordinates for the screen under test")
        .line(1, "motion.Swipe(100, 200, 300, 400, 500)");
    f
}
