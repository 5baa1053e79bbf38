use tracing::{debug, warn};

use crate::code::CodeTag;
use crate::config::Config;
use crate::error::Result;
use crate::escape::escape_latex;
use crate::render::{Alignment, AutolinkType, ListType, Render};
use crate::table::{self, Cell};

const SECTIONING: [&str; 6] = [
    "chapter",
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

/// Renders Markdown elements as LaTeX fragments.
///
/// The output expects a preamble that loads `minted`, `graphicx`, `booktabs`,
/// `hyperref` and `xcolor`, and defines the `sourceCode`/`sourceCodeN`
/// environments plus the `\strikeThrough` and `\underLine` commands.
#[derive(Debug, Clone)]
pub struct LatexRenderer {
    config: Config,
}

impl LatexRenderer {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn figure(&self, link: &str, caption: Option<&str>) -> String {
        let figure = &self.config.figure;
        let mut out = format!(
            "\\begin{{figure}}[{}]\\centering\n\\includegraphics[width={}]{{{link}}}\n",
            figure.placement, figure.width
        );
        if let Some(caption) = caption {
            out.push_str(&format!("\\caption{{{caption}}}"));
        }
        out.push_str("\\end{figure}\n");
        out
    }
}

impl Default for LatexRenderer {
    fn default() -> Self {
        Self::new(&Config::compiled_default())
    }
}

/// Sectioning command for a heading level. Levels outside 1..=6 are clamped
/// to the nearest end.
pub fn sectioning_command(level: u8) -> &'static str {
    let index = usize::from(level.clamp(1, 6)) - 1;
    SECTIONING[index]
}

fn column_spec(alignment: Alignment) -> char {
    match alignment {
        Alignment::Center => 'c',
        Alignment::Right => 'r',
        Alignment::Left | Alignment::None => 'l',
    }
}

fn join_cells(cells: &[Cell]) -> String {
    cells
        .iter()
        .map(|cell| cell.content.as_str())
        .collect::<Vec<_>>()
        .join(" & ")
}

impl Render for LatexRenderer {
    fn block_code(&self, code: &str, language: Option<&str>) -> String {
        let tag = CodeTag::parse(language, &self.config.code.default_language);
        let minted = format!(
            "\\begin{{minted}}[fontsize=\\{}]{{{}}}\n{code}\\end{{minted}}\n",
            self.config.code.font_size, tag.language
        );
        match tag.filename {
            Some(filename) => {
                format!("\\begin{{sourceCode}}{{{filename}}}\n{minted}\\end{{sourceCode}}\n")
            }
            None => format!("\\begin{{sourceCodeN}}\n{minted}\\end{{sourceCodeN}}\n"),
        }
    }

    fn block_quote(&self, quote: &str) -> String {
        format!("\\begin{{quote}}\n{}\n\\end{{quote}}\n\n", quote.trim())
    }

    fn footnotes(&self, content: &str) -> String {
        content.to_string()
    }

    fn footnote_def(&self, content: &str, number: usize) -> String {
        format!("\\footnotetext[{number}]{{{}}}", content.trim())
    }

    fn header(&self, text: &str, level: u8) -> String {
        if !(1..=6).contains(&level) {
            warn!(heading_level = level, "heading level out of range, clamping");
        }
        format!("\\{}{{{text}}}\n", sectioning_command(level))
    }

    fn hrule(&self) -> String {
        "\\noindent{\\color{gray}\\hrulefill}\n\n".to_string()
    }

    fn list(&self, contents: &str, list_type: ListType) -> String {
        let env = match list_type {
            ListType::Ordered => "enumerate",
            ListType::Unordered => "itemize",
        };
        format!("\\begin{{{env}}}\n{contents}\\end{{{env}}}\n")
    }

    fn list_item(&self, text: &str, _list_type: ListType) -> String {
        format!("\\item {text}")
    }

    fn paragraph(&self, text: &str) -> String {
        format!("{text}\n\n")
    }

    fn table(&self, header: &str, body: &str) -> Result<String> {
        let headers = table::unpack_header(header)?;
        let rows = table::unpack_body(body)?;
        debug!(columns = headers.len(), rows = rows.len(), "rendering table");

        let spec: String = headers.iter().map(|cell| column_spec(cell.alignment)).collect();
        let body = rows
            .iter()
            .map(|row| join_cells(row))
            .collect::<Vec<_>>()
            .join(" \\\\\n");

        Ok(format!(
            "\\begin{{table}}[{}]\\centering\n\
             \\begin{{tabular}}{{{spec}}}\n\
             \\toprule\n\
             {} \\\\\\midrule\n\
             {body}\n\
             \\bottomrule\n\
             \\end{{tabular}}\n\
             \\end{{table}}\n",
            self.config.table.placement,
            join_cells(&headers),
        ))
    }

    fn table_row(&self, content: &str) -> String {
        format!("{content}\n")
    }

    fn table_cell(&self, content: &str, alignment: Alignment, header: bool) -> String {
        let cell = Cell {
            content: content.to_string(),
            alignment,
            header,
        };
        format!("{}\n", cell.pack())
    }

    fn autolink(&self, link: &str, _link_type: AutolinkType) -> String {
        format!("\\url{{{link}}}")
    }

    fn codespan(&self, code: &str) -> String {
        format!("\\texttt{{{code}}}")
    }

    fn double_emphasis(&self, text: &str) -> String {
        format!("\\textbf{{{text}}}")
    }

    fn emphasis(&self, text: &str) -> String {
        format!("\\textit{{{text}}}")
    }

    fn triple_emphasis(&self, text: &str) -> String {
        format!("\\textbf{{\\textit{{{text}}}}}")
    }

    fn strikethrough(&self, text: &str) -> String {
        format!("\\strikeThrough{{{text}}}")
    }

    fn superscript(&self, text: &str) -> String {
        format!("\\textsuperscript{{{text}}}")
    }

    fn underline(&self, text: &str) -> String {
        format!("\\underLine{{{text}}}")
    }

    fn image(&self, link: &str, _title: Option<&str>, alt_text: Option<&str>) -> String {
        self.figure(link, alt_text)
    }

    fn link(&self, link: &str, _title: Option<&str>, content: &str) -> String {
        format!("{content}\\footnote{{\\url{{{link}}}}}")
    }

    fn linebreak(&self) -> String {
        "\n".to_string()
    }

    fn footnote_ref(&self, number: usize) -> String {
        format!("\\footnotemark[{number}]")
    }

    fn quote(&self, text: &str) -> String {
        format!("``{text}''")
    }

    fn entity(&self, text: &str) -> String {
        escape_latex(text)
    }

    fn normal_text(&self, text: &str) -> String {
        escape_latex(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn renderer() -> LatexRenderer {
        LatexRenderer::default()
    }

    #[test]
    fn header_levels() {
        let r = renderer();
        let commands: Vec<String> = (1..=6).map(|level| r.header("T", level)).collect();
        assert_eq!(
            commands,
            [
                "\\chapter{T}\n",
                "\\section{T}\n",
                "\\subsection{T}\n",
                "\\subsubsection{T}\n",
                "\\paragraph{T}\n",
                "\\subparagraph{T}\n",
            ]
        );
    }

    #[test]
    fn header_level_is_clamped() {
        assert_eq!(sectioning_command(0), "chapter");
        assert_eq!(sectioning_command(9), "subparagraph");
    }

    #[test]
    fn code_block_with_filename() {
        assert_eq!(
            renderer().block_code("print(1)\n", Some("python:app.py")),
            "\\begin{sourceCode}{app.py}\n\
             \\begin{minted}[fontsize=\\footnotesize]{python}\n\
             print(1)\n\
             \\end{minted}\n\
             \\end{sourceCode}\n"
        );
    }

    #[test]
    fn code_block_without_filename() {
        assert_eq!(
            renderer().block_code("x = {1}\n", Some("python")),
            "\\begin{sourceCodeN}\n\
             \\begin{minted}[fontsize=\\footnotesize]{python}\n\
             x = {1}\n\
             \\end{minted}\n\
             \\end{sourceCodeN}\n"
        );
        assert!(
            renderer()
                .block_code("a_b\n", None)
                .contains("\\begin{minted}[fontsize=\\footnotesize]{text}\na_b\n")
        );
    }

    #[test]
    fn quote_and_footnote_def_are_trimmed() {
        let r = renderer();
        assert_eq!(
            r.block_quote("wise words\n\n"),
            "\\begin{quote}\nwise words\n\\end{quote}\n\n"
        );
        assert_eq!(r.footnote_def("note\n\n", 2), "\\footnotetext[2]{note}");
    }

    #[test]
    fn lists() {
        let r = renderer();
        let items = r.list_item("one\n", ListType::Ordered) + &r.list_item("two\n", ListType::Ordered);
        assert_eq!(
            r.list(&items, ListType::Ordered),
            "\\begin{enumerate}\n\\item one\n\\item two\n\\end{enumerate}\n"
        );
        assert_eq!(
            r.list("\\item x\n", ListType::Unordered),
            "\\begin{itemize}\n\\item x\n\\end{itemize}\n"
        );
    }

    #[test]
    fn hrule() {
        assert_eq!(
            renderer().hrule(),
            "\\noindent{\\color{gray}\\hrulefill}\n\n"
        );
    }

    #[test]
    fn two_column_table() {
        let r = renderer();
        let header = r.table_row(
            &(r.table_cell("A", Alignment::Left, true) + &r.table_cell("B", Alignment::Right, true)),
        );
        let body = r.table_row(
            &(r.table_cell("1", Alignment::Left, false) + &r.table_cell("2", Alignment::Right, false)),
        );
        assert_eq!(
            r.table(&header, &body).unwrap(),
            "\\begin{table}[htbp]\\centering\n\
             \\begin{tabular}{lr}\n\
             \\toprule\n\
             A & B \\\\\\midrule\n\
             1 & 2\n\
             \\bottomrule\n\
             \\end{tabular}\n\
             \\end{table}\n"
        );
    }

    #[test]
    fn table_rows_are_joined_with_row_breaks() {
        let r = renderer();
        let row = |a: &str, b: &str, header| {
            r.table_row(
                &(r.table_cell(a, Alignment::Center, header)
                    + &r.table_cell(b, Alignment::None, header)),
            )
        };
        let header = row("H1", "H2", true);
        let body = row("a", "b", false) + &row("c", "d", false);
        let out = r.table(&header, &body).unwrap();
        assert!(out.contains("\\begin{tabular}{cl}\n"));
        assert!(out.contains("\na & b \\\\\nc & d\n\\bottomrule\n"));
    }

    #[test]
    fn corrupted_table_is_an_error() {
        let err = renderer().table("not a record\n", "").unwrap_err();
        assert!(matches!(err, Error::MalformedCell { .. }));
    }

    #[test]
    fn spans() {
        let r = renderer();
        assert_eq!(r.emphasis("x"), "\\textit{x}");
        assert_eq!(r.double_emphasis("x"), "\\textbf{x}");
        assert_eq!(r.triple_emphasis("x"), "\\textbf{\\textit{x}}");
        assert_eq!(r.strikethrough("x"), "\\strikeThrough{x}");
        assert_eq!(r.superscript("x"), "\\textsuperscript{x}");
        assert_eq!(r.underline("x"), "\\underLine{x}");
        assert_eq!(r.codespan("a_b"), "\\texttt{a_b}");
        assert_eq!(r.quote("hi"), "``hi''");
        assert_eq!(r.footnote_ref(3), "\\footnotemark[3]");
        assert_eq!(r.linebreak(), "\n");
    }

    #[test]
    fn links_become_footnoted_urls() {
        let r = renderer();
        assert_eq!(
            r.link("https://x.test", None, "here"),
            "here\\footnote{\\url{https://x.test}}"
        );
        assert_eq!(
            r.autolink("https://x.test", AutolinkType::Url),
            "\\url{https://x.test}"
        );
    }

    #[test]
    fn image_with_and_without_caption() {
        let r = renderer();
        assert_eq!(
            r.image("cat.png", None, Some("A cat")),
            "\\begin{figure}[htbp]\\centering\n\
             \\includegraphics[width=0.9\\linewidth]{cat.png}\n\
             \\caption{A cat}\\end{figure}\n"
        );
        let bare = r.image("cat.png", None, None);
        assert_eq!(
            bare,
            "\\begin{figure}[htbp]\\centering\n\
             \\includegraphics[width=0.9\\linewidth]{cat.png}\n\
             \\end{figure}\n"
        );
        assert!(!bare.contains("\\caption"));
    }

    #[test]
    fn text_and_entities_are_escaped() {
        let r = renderer();
        assert_eq!(r.normal_text("50% of $x"), "50\\% of \\$x");
        assert_eq!(r.entity("&"), "\\&");
    }

    #[test]
    fn config_changes_output() {
        let mut config = Config::default();
        config.code.font_size = "small".to_string();
        config.figure.width = "\\textwidth".to_string();
        config.table.placement = "H".to_string();
        let r = LatexRenderer::new(&config);
        assert!(r.block_code("x\n", None).contains("[fontsize=\\small]"));
        assert!(r.image("a.png", None, None).contains("[width=\\textwidth]"));
        let header = r.table_row(&r.table_cell("A", Alignment::Left, true));
        assert!(r.table(&header, "").unwrap().starts_with("\\begin{table}[H]"));
    }
}
