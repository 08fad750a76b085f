use comfy_table::{presets::UTF8_FULL, Attribute, Cell, CellAlignment, ContentArrangement, Table};
use crossterm::style::Stylize;
use factum::{Fact, Matching, QueryOutcome};

pub struct Formatter {
    use_colors: bool,
}

impl Default for Formatter {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

impl Formatter {
    pub fn format_query(&self, text: &str, outcome: &QueryOutcome) -> String {
        match outcome {
            QueryOutcome::True => format!("{}  {}\n", text, self.verdict("true", true)),
            QueryOutcome::False => format!("{}  {}\n", text, self.verdict("false", false)),
            QueryOutcome::Matchings(matchings) => self.format_matchings(text, matchings),
        }
    }

    fn verdict(&self, word: &str, truthy: bool) -> String {
        if !self.use_colors {
            return word.to_string();
        }
        if truthy {
            word.green().bold().to_string()
        } else {
            word.red().bold().to_string()
        }
    }

    fn format_matchings(&self, text: &str, matchings: &[Matching]) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![Cell::new(format!("{} — {} match(es)", text, matchings.len()))
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Left)]);

        for matching in matchings {
            let bindings = matching
                .entries()
                .iter()
                .map(|(k, v)| format!("{} = {}", k.text, v.text))
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(vec![Cell::new(bindings).set_alignment(CellAlignment::Left)]);
        }

        format!("{}\n", table)
    }

    pub fn format_goal(&self, text: &str, fulfillments: &[Vec<Fact>]) -> String {
        let mut output = String::default();

        output.push_str(&self.section_divider());
        output.push_str(&self.style_header(&format!("  goal: {text}")));
        output.push_str(&self.section_divider());

        if fulfillments.is_empty() {
            output.push_str("  already known, or no rule can derive it\n");
            return output;
        }

        output.push_str(&format!(
            "  {} way{} to satisfy this goal\n\n",
            fulfillments.len(),
            if fulfillments.len() == 1 { "" } else { "s" }
        ));

        for (i, needed) in fulfillments.iter().enumerate() {
            if fulfillments.len() > 1 {
                output.push_str(&self.subsection_header(&format!("Option {}", i + 1)));
            }
            if needed.is_empty() {
                output.push_str("  (no further facts needed)\n");
            } else {
                for fact in needed {
                    output.push_str(&format!("  - {fact}\n"));
                }
            }
            output.push('\n');
        }

        output
    }

    fn section_divider(&self) -> String {
        if self.use_colors {
            format!("{}\n", "─".repeat(80).dark_grey())
        } else {
            format!("{}\n", "─".repeat(80))
        }
    }

    fn style_header(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}\n", text.cyan().bold())
        } else {
            format!("{}\n", text)
        }
    }

    fn subsection_header(&self, text: &str) -> String {
        if self.use_colors {
            format!("  {}\n", text.bold())
        } else {
            format!("  {}\n", text)
        }
    }
}
