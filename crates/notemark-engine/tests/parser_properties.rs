use notemark_engine::{
    Alignment, Block, EditableDocument, FontSlant, FontWeight, ListStyle, Run, parse,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("")]
#[case("\n\n\n")]
#[case("{table}\n{columns}\n>>>###\n```")]
#[case("*** ___ ~~ == <u> ` [ ] ( ) {size:} {color:}")]
#[case("{/align}{/table}{/columns}<<<")]
#[case("| | | |\n|-|\n{header:99999999999999999999}")]
#[case("\u{0}\u{1}\r\n\t{align:center}")]
fn parsing_is_total(#[case] source: &str) {
    // No panic and a structurally valid document, whatever the input.
    let document = parse(source);
    for block in &document.blocks {
        if let Block::Heading { level, .. } = block {
            assert!((1..=6).contains(level));
        }
    }
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(4)]
#[case(5)]
#[case(6)]
fn heading_identity(#[case] level: u8) {
    let source = format!("{} plain title", "#".repeat(level as usize));
    let document = parse(&source);
    assert_eq!(
        document.blocks,
        vec![Block::Heading {
            level,
            runs: vec![Run::plain("plain title")],
        }]
    );
}

#[test]
fn emphasis_tie_break() {
    let document = parse("**bold** and *italic*");
    let Block::Paragraph { runs, .. } = &document.blocks[0] else {
        panic!("expected paragraph");
    };
    assert_eq!(runs.len(), 3);
    assert_eq!(
        (runs[0].text.as_str(), runs[0].style.weight),
        ("bold", FontWeight::Bold)
    );
    assert_eq!(runs[0].style.slant, FontSlant::Normal);
    assert_eq!(runs[1], Run::plain(" and "));
    assert_eq!(
        (runs[2].text.as_str(), runs[2].style.slant),
        ("italic", FontSlant::Italic)
    );
    assert_eq!(runs[2].style.weight, FontWeight::Normal);
}

#[test]
fn color_and_size_merge_on_one_run() {
    let document = parse("{color:red}{size:24}Alert{/size}{/color}");
    let Block::Paragraph { runs, .. } = &document.blocks[0] else {
        panic!("expected paragraph");
    };
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].text, "Alert");
    assert_eq!(runs[0].style.color.as_deref(), Some("red"));
    assert_eq!(runs[0].style.font_size, 24.0);
}

#[test]
fn header_marker_applies_to_following_table() {
    let document = parse("{header}\n{table}\na|b\n---|---\n1|2\n{/table}");
    let Block::Table {
        headers,
        rows,
        header_rows,
        ..
    } = &document.blocks[0]
    else {
        panic!("expected table");
    };
    assert_eq!(headers, &vec!["a".to_string(), "b".to_string()]);
    assert_eq!(rows, &vec![vec!["1".to_string(), "2".to_string()]]);
    assert!(header_rows.contains(&0));
}

#[test]
fn unterminated_toggle_is_finalized() {
    let document = parse(">>>## Section\ncontent");
    assert_eq!(
        document.blocks,
        vec![Block::ToggleHeading {
            level: 2,
            title: vec![Run::plain("Section")],
            content: vec![Block::Paragraph {
                runs: vec![Run::plain("content")],
                alignment: Alignment::Left,
            }],
        }]
    );
}

#[test]
fn deep_inline_nesting_terminates() {
    let mut text = "core".to_string();
    for level in 1..=14 {
        text = format!("{{size:{level}}}{text}{{/size}}");
    }
    let document = parse(&text);
    let Block::Paragraph { runs, .. } = &document.blocks[0] else {
        panic!("expected paragraph");
    };
    let flat: String = runs.iter().map(|r| r.text.as_str()).collect();
    assert!(flat.contains("core"));
}

#[test]
fn mixed_document_end_to_end() {
    let source = "\
# Notes

intro with a [link](https://e.com) and `code`

>>>## Details
{columns}
left cell
{---}
- [ ] task
{/columns}
<<<

{align:center}
centered text
{/align}

```python
print(1)
```

col_a|col_b
---|---
1|2

> quoted
![pic](p.png)
---
final";
    let document = parse(source);
    let kinds: Vec<&str> = document
        .blocks
        .iter()
        .map(|b| match b {
            Block::Paragraph { .. } => "paragraph",
            Block::Heading { .. } => "heading",
            Block::CodeBlock { .. } => "code",
            Block::Blockquote { .. } => "quote",
            Block::ListItem { .. } => "list",
            Block::HorizontalRule => "rule",
            Block::Image { .. } => "image",
            Block::ToggleHeading { .. } => "toggle",
            Block::Columns { .. } => "columns",
            Block::Table { .. } => "table",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "heading",
            "paragraph",
            "toggle",
            "paragraph",
            "code",
            "table",
            "quote",
            "image",
            "rule",
            "paragraph",
        ]
    );

    let Block::ToggleHeading { content, .. } = &document.blocks[2] else {
        panic!("expected toggle");
    };
    let Block::Columns { columns } = &content[0] else {
        panic!("expected columns inside toggle");
    };
    assert_eq!(columns.len(), 2);
    assert!(matches!(
        columns[1][0],
        Block::ListItem {
            style: ListStyle::Checkbox(false),
            ..
        }
    ));

    let Block::Paragraph { alignment, .. } = &document.blocks[3] else {
        panic!("expected aligned paragraph");
    };
    assert_eq!(*alignment, Alignment::Center);
}

#[test]
fn document_serializes_round_trip() {
    let document = parse("# a\n\n**b** {color:red}c{/color}\n\n{table}\nx|y\n---|---\n1|2\n{/table}");
    let json = serde_json::to_string(&document).unwrap();
    let back: notemark_engine::Document = serde_json::from_str(&json).unwrap();
    assert_eq!(document, back);
}

#[test]
fn click_to_edit_round_trip() {
    let mut doc = EditableDocument::new("# Title\n\nclick me\n\n> keep");
    let index = doc.block_at(12).expect("offset inside second block");
    assert_eq!(index, 1);
    doc.commit(index, "edited").unwrap();
    assert_eq!(doc.source(), "# Title\n\nedited\n\n> keep");
    assert_eq!(doc.blocks().len(), 3);
    assert_eq!(doc.version(), 1);
}
