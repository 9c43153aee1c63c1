//! Parse a JSON document and print its tree.
//!
//! Run with: `cargo run --example json`

use scanless::grammar::{
    any_of, lit, pattern, possibly, rule, seq, zero_or_more, Grammar, GrammarBuilder,
};
use scanless::ParseNode;

/// Inline captureless whitespace: consumed, but absent from the tree.
fn ws() -> scanless::grammar::Production {
    possibly(pattern(r"\s+"))
}

fn json_grammar() -> Result<Grammar, scanless::GrammarError> {
    GrammarBuilder::new()
        .entry_point("json")
        .rule("json", seq([ws(), rule("value"), ws()]))
        .rule(
            "value",
            any_of([
                rule("object"),
                rule("array"),
                rule("string"),
                rule("number"),
                rule("constant"),
            ]),
        )
        .rule(
            "object",
            seq([
                lit("{"),
                ws(),
                possibly(rule("members")),
                ws(),
                lit("}"),
            ]),
        )
        .rule(
            "members",
            seq([
                rule("member"),
                zero_or_more(seq([ws(), lit(","), rule("member")])),
            ]),
        )
        .rule(
            "member",
            seq([
                ws(),
                rule("string"),
                ws(),
                lit(":"),
                ws(),
                rule("value"),
            ]),
        )
        .rule(
            "array",
            seq([
                lit("["),
                ws(),
                possibly(rule("items")),
                ws(),
                lit("]"),
            ]),
        )
        .rule(
            "items",
            seq([
                rule("value"),
                zero_or_more(seq([ws(), lit(","), ws(), rule("value")])),
            ]),
        )
        .rule("string", pattern(r#""(?<text>(?:[^"\\]|\\.)*)""#))
        .rule(
            "number",
            pattern(r"(?<text>-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?)"),
        )
        .rule("constant", pattern("(?<text>true|false|null)"))
        .build()
}

fn print_tree(node: &ParseNode<'_>, indent: usize) {
    println!(
        "{:indent$}{} [{}..{}] {:?}",
        "",
        node.name,
        node.start,
        node.end,
        node.text
    );
    for child in &node.children {
        print_tree(child, indent + 2);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let grammar = json_grammar()?;
    let input = r#"{"menu": {"id": 17, "items": ["open", "close", null], "pi": 3.14}}"#;

    match grammar.parse(input) {
        Ok(nodes) => {
            for node in &nodes {
                print_tree(node, 0);
            }
        }
        Err(err) => eprintln!("{err}"),
    }

    // A broken document demonstrates the furthest-failure diagnostic.
    let err = grammar.parse(r#"{"menu": [1, 2 "#).unwrap_err();
    println!("\n{err}");

    Ok(())
}
