//! Constructors for the diagnostics the parser reports.

use razor_errors::RazorDiagnostic;
use text_size::TextRange;

pub(crate) fn end_of_file_after_transition(span: TextRange) -> RazorDiagnostic {
    RazorDiagnostic::error(
        "RZ1001",
        "End-of-file was found after the \"@\" character. \"@\" must be followed by a valid code \
         block. If you want to output an \"@\", escape it using the sequence: \"@@\".",
        span,
    )
}

pub(crate) fn whitespace_after_transition(span: TextRange) -> RazorDiagnostic {
    RazorDiagnostic::error(
        "RZ1004",
        "A space or line break was encountered after the \"@\" character. Only valid identifiers, \
         keywords, comments, \"(\" and \"{\" are valid at the start of a code block and they must \
         occur immediately following \"@\" with no space in between.",
        span,
    )
}

pub(crate) fn invalid_code_block_start(found: &str, span: TextRange) -> RazorDiagnostic {
    RazorDiagnostic::error(
        "RZ1005",
        format!(
            "\"{found}\" is not valid at the start of a code block. Only identifiers, keywords, \
             comments, \"(\" and \"{{\" are valid."
        ),
        span,
    )
}

pub(crate) fn missing_closer(
    block: &str,
    open: char,
    close: char,
    span: TextRange,
) -> RazorDiagnostic {
    RazorDiagnostic::error(
        "RZ1006",
        format!(
            "The {block} block is missing a closing \"{close}\" character. Make sure you have a \
             matching \"{close}\" character for all the \"{open}\" characters within this block, \
             and that none of the \"{close}\" characters are being interpreted as markup."
        ),
        span,
    )
}

pub(crate) fn directive_expects_value(name: &str, span: TextRange) -> RazorDiagnostic {
    RazorDiagnostic::error("RZ1012", format!("The \"{name}\" directive expects a value."), span)
}

pub(crate) fn unterminated_comment(span: TextRange) -> RazorDiagnostic {
    RazorDiagnostic::error(
        "RZ1016",
        "The Razor comment is not terminated. All Razor comments must be terminated with a \"*@\".",
        span,
    )
}

pub(crate) fn directive_expects_block(name: &str, span: TextRange) -> RazorDiagnostic {
    RazorDiagnostic::error(
        "RZ1017",
        format!("Unexpected literal following the \"{name}\" directive. Expected \"{{\"."),
        span,
    )
}
