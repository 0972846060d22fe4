use super::*;
use expect_test::{Expect, expect};
use std::fmt::Write;

fn check(src: &str, expect: Expect) {
    let mut actual = String::new();
    for token in Cursor::new(src) {
        writeln!(actual, "{token:?}").unwrap();
    }
    expect.assert_eq(&actual);
}

#[test]
fn smoke_test() {
    check(
        "/* my source */ contract C { uint x = \"zebra\"; }\n",
        expect![[r#"
            RawToken { kind: BlockComment { terminated: true }, len: 15 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Ident, len: 8 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Ident, len: 1 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Punct(OpenBrace), len: 1 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Ident, len: 4 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Ident, len: 1 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Punct(Eq), len: 1 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Literal { kind: Str { terminated: true } }, len: 7 }
            RawToken { kind: Punct(Semi), len: 1 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Punct(CloseBrace), len: 1 }
            RawToken { kind: Whitespace, len: 1 }
        "#]],
    );
}

#[test]
fn comments() {
    check(
        "// line\n/* block */ /* open",
        expect![[r#"
            RawToken { kind: LineComment, len: 7 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: BlockComment { terminated: true }, len: 11 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: BlockComment { terminated: false }, len: 7 }
        "#]],
    );
}

#[test]
fn slashes() {
    check(
        "a/b/=c",
        expect![[r#"
            RawToken { kind: Ident, len: 1 }
            RawToken { kind: Punct(Slash), len: 1 }
            RawToken { kind: Ident, len: 1 }
            RawToken { kind: Punct(SlashEq), len: 2 }
            RawToken { kind: Ident, len: 1 }
        "#]],
    );
}

#[test]
fn longest_punctuation() {
    use TokenKind as T;

    let puncts = |src: &str| -> Vec<T> {
        Cursor::new(src)
            .filter_map(|t| match t.kind {
                RawTokenKind::Punct(kind) => Some(kind),
                RawTokenKind::Whitespace => None,
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    };
    assert_eq!(puncts("=> := =: == = <<= >>= << >> <= >="), [
        T::FatArrow,
        T::ColonEq,
        T::EqColon,
        T::EqEq,
        T::Eq,
        T::ShlEq,
        T::ShrEq,
        T::Shl,
        T::Shr,
        T::Le,
        T::Ge,
    ]);
    assert_eq!(puncts("** *= ++ += -- -= && &= || |= ^= %= !="), [
        T::StarStar,
        T::StarEq,
        T::PlusPlus,
        T::PlusEq,
        T::MinusMinus,
        T::MinusEq,
        T::AndAnd,
        T::AndEq,
        T::OrOr,
        T::OrEq,
        T::CaretEq,
        T::PercentEq,
        T::Ne,
    ]);
    // No arrow token: assembly return arrows are two tokens.
    assert_eq!(puncts("->"), [T::Minus, T::Gt]);
}

#[test]
fn numbers() {
    check(
        "1_000 0x1f_ff 0x 1.5 .5 1e18 2.5e-3 0.8 0.8.20",
        expect![[r#"
            RawToken { kind: Literal { kind: Int { hex: false, empty_int: false } }, len: 5 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Literal { kind: Int { hex: true, empty_int: false } }, len: 7 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Literal { kind: Int { hex: true, empty_int: true } }, len: 2 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Literal { kind: Rational }, len: 3 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Literal { kind: Rational }, len: 2 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Literal { kind: Rational }, len: 4 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Literal { kind: Rational }, len: 6 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Literal { kind: Rational }, len: 3 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Literal { kind: Version }, len: 6 }
        "#]],
    );
    // Member access on an integer, and an `e` that does not start an exponent.
    check(
        "1.x 1else",
        expect![[r#"
            RawToken { kind: Literal { kind: Int { hex: false, empty_int: false } }, len: 1 }
            RawToken { kind: Punct(Dot), len: 1 }
            RawToken { kind: Ident, len: 1 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Literal { kind: Int { hex: false, empty_int: false } }, len: 1 }
            RawToken { kind: Ident, len: 4 }
        "#]],
    );
}

#[test]
fn strings() {
    check(
        r#""a\"b" 'a'"#,
        expect![[r#"
            RawToken { kind: Literal { kind: Str { terminated: true } }, len: 6 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Literal { kind: Str { terminated: true } }, len: 3 }
        "#]],
    );
    check(
        "\"abc\nx",
        expect![[r#"
            RawToken { kind: Literal { kind: Str { terminated: false } }, len: 4 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Ident, len: 1 }
        "#]],
    );
    check(
        "hex\"00ff\" unicode'é' hexa abc\"x\"",
        expect![[r#"
            RawToken { kind: Literal { kind: HexStr { terminated: true } }, len: 9 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Literal { kind: UnicodeStr { terminated: true } }, len: 11 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Ident, len: 4 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: UnknownPrefix, len: 3 }
            RawToken { kind: Literal { kind: Str { terminated: true } }, len: 3 }
        "#]],
    );
}

#[test]
fn unknown() {
    check(
        "#@λ\u{0C}",
        expect![[r#"
            RawToken { kind: Unknown, len: 1 }
            RawToken { kind: Unknown, len: 1 }
            RawToken { kind: Unknown, len: 2 }
            RawToken { kind: Whitespace, len: 1 }
        "#]],
    );
}

#[test]
fn idents() {
    assert!(is_ident("$foo_1"));
    assert!(is_ident("_"));
    assert!(!is_ident("1a"));
    assert!(!is_ident(""));
    check(
        "uint256 $x",
        expect![[r#"
            RawToken { kind: Ident, len: 7 }
            RawToken { kind: Whitespace, len: 1 }
            RawToken { kind: Ident, len: 2 }
        "#]],
    );
}
