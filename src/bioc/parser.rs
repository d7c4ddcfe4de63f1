use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::debug;

pub(crate) const XML_DECL: &str = "<?xml";

#[derive(Debug, thiserror::Error)]
enum MarkupError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error("CDATA is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("unclosed element at end of input")]
    Unclosed,

    #[error("no root element")]
    NoRoot,

    #[error("content after root element")]
    TrailingContent,

    #[error("text outside root element")]
    StrayText,
}

/// One open element while walking the tree.
enum Frame {
    Document,
    /// `text_taken` flips on the first direct `<text>` child; later ones are ignored.
    Passage { text_taken: bool },
    /// Collects character data up to the first child element.
    Text { buf: String, capturing: bool },
    Other,
}

/// Extract passage texts from a BioC XML document in document order.
///
/// Leading noise before the `<?xml` declaration is dropped. Each `<passage>`
/// under a `<document>` (the root itself may be the document) contributes the
/// text of its first direct `<text>` child when that text is non-empty.
/// Malformed markup yields an empty list.
pub fn parse_passages(raw: &str) -> Vec<String> {
    let cleaned = match raw.find(XML_DECL) {
        Some(idx) => raw[idx..].trim(),
        None => raw.trim(),
    };

    match walk(cleaned) {
        Ok(passages) => passages,
        Err(e) => {
            debug!(error = %e, "discarding malformed BioC document");
            Vec::new()
        }
    }
}

fn walk(xml: &str) -> Result<Vec<String>, MarkupError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Frame> = Vec::new();
    let mut passages = Vec::new();
    let mut root_closed = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if root_closed {
                    return Err(MarkupError::TrailingContent);
                }
                let frame = open_child(&mut stack, &e);
                stack.push(frame);
            }
            Event::Empty(e) => {
                if root_closed {
                    return Err(MarkupError::TrailingContent);
                }
                // An empty root is a complete document.
                open_child(&mut stack, &e);
                if stack.is_empty() {
                    root_closed = true;
                }
            }
            Event::End(_) => {
                if let Some(Frame::Text { buf, .. }) = stack.pop()
                    && !buf.is_empty()
                {
                    passages.push(buf);
                }
                if stack.is_empty() {
                    root_closed = true;
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(c) => {
                let text = std::str::from_utf8(&c)?;
                push_text(&mut stack, text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(MarkupError::Unclosed);
    }
    if !root_closed {
        return Err(MarkupError::NoRoot);
    }
    Ok(passages)
}

/// Classify a newly opened element against its ancestors.
fn open_child(stack: &mut [Frame], e: &BytesStart<'_>) -> Frame {
    let in_document = stack.iter().any(|f| matches!(f, Frame::Document));

    match stack.last_mut() {
        Some(Frame::Text { capturing, .. }) => *capturing = false,
        Some(Frame::Passage { text_taken }) if e.local_name().as_ref() == b"text" => {
            if *text_taken {
                return Frame::Other;
            }
            *text_taken = true;
            return Frame::Text {
                buf: String::new(),
                capturing: true,
            };
        }
        _ => {}
    }

    match e.local_name().as_ref() {
        b"document" => Frame::Document,
        b"passage" if in_document => Frame::Passage { text_taken: false },
        _ => Frame::Other,
    }
}

fn push_text(stack: &mut [Frame], text: &str) -> Result<(), MarkupError> {
    match stack.last_mut() {
        Some(Frame::Text {
            buf,
            capturing: true,
        }) => buf.push_str(text),
        None if !text.trim().is_empty() => return Err(MarkupError::StrayText),
        _ => {}
    }
    Ok(())
}
