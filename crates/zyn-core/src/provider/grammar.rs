//! Tokenizer and top-level declaration recognizer behind the provider surface.
//!
//! Recognizes the declaration shapes the semantic layer models (functions,
//! variables, tests, type expressions) and files everything else under an
//! `Unknown` node. Malformed declarations produce an error report and the
//! recognizer resynchronizes at the next plausible top-level anchor, so one
//! bad declaration never stops node production.

use id_arena::Arena;

use super::{
    ContainerKind, ErrorReport, Modifiers, NodeId, NodeTag, RawNode, RawParam, Span,
    SyntaxProvider, Token, TokenTag,
};

pub(crate) struct ParseOutcome {
    pub nodes: Arena<RawNode>,
    pub order: Vec<NodeId>,
    pub roots: Vec<NodeId>,
    pub tokens: Vec<Token>,
    pub errors: Vec<ErrorReport>,
}

pub(crate) fn parse(source: &str) -> ParseOutcome {
    let tokens = lex(source);
    let mut parser = Parser {
        src: source,
        tokens: &tokens,
        pos: 0,
        nodes: Arena::new(),
        order: Vec::new(),
        roots: Vec::new(),
        errors: Vec::new(),
    };
    parser.run();
    ParseOutcome {
        nodes: parser.nodes,
        order: parser.order,
        roots: parser.roots,
        errors: parser.errors,
        tokens,
    }
}

fn lex(source: &str) -> Vec<Token> {
    let provider = SyntaxProvider::global();
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if b == b'/' && bytes.get(pos + 1) == Some(&b'/') {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }

        let start = pos;
        let tag = match b {
            b'(' => {
                pos += 1;
                TokenTag::LParen
            }
            b')' => {
                pos += 1;
                TokenTag::RParen
            }
            b'{' => {
                pos += 1;
                TokenTag::LBrace
            }
            b'}' => {
                pos += 1;
                TokenTag::RBrace
            }
            b'[' => {
                pos += 1;
                TokenTag::LBracket
            }
            b']' => {
                pos += 1;
                TokenTag::RBracket
            }
            b',' => {
                pos += 1;
                TokenTag::Comma
            }
            b':' => {
                pos += 1;
                TokenTag::Colon
            }
            b';' => {
                pos += 1;
                TokenTag::Semicolon
            }
            b'=' => {
                pos += 1;
                TokenTag::Equal
            }
            b'!' => {
                pos += 1;
                TokenTag::Bang
            }
            b'?' => {
                pos += 1;
                TokenTag::Question
            }
            b'*' => {
                pos += 1;
                TokenTag::Asterisk
            }
            b'"' => {
                pos += 1;
                while pos < bytes.len() {
                    match bytes[pos] {
                        // clamp: an unterminated literal may end in an escape
                        b'\\' => pos = (pos + 2).min(bytes.len()),
                        b'"' => {
                            pos += 1;
                            break;
                        }
                        _ => pos += 1,
                    }
                }
                TokenTag::StringLiteral
            }
            b'\'' => {
                pos += 1;
                while pos < bytes.len() {
                    match bytes[pos] {
                        b'\\' => pos = (pos + 2).min(bytes.len()),
                        b'\'' => {
                            pos += 1;
                            break;
                        }
                        _ => pos += 1,
                    }
                }
                TokenTag::Other
            }
            b'0'..=b'9' => {
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric()
                        || bytes[pos] == b'_'
                        || bytes[pos] == b'.')
                {
                    pos += 1;
                }
                TokenTag::NumberLiteral
            }
            b if b.is_ascii_alphabetic() || b == b'_' || b == b'@' => {
                pos += 1;
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
                {
                    pos += 1;
                }
                provider
                    .keyword(&source[start..pos])
                    .unwrap_or(TokenTag::Identifier)
            }
            _ => {
                pos += 1;
                TokenTag::Other
            }
        };
        tokens.push(Token {
            tag,
            start,
            end: pos,
        });
    }
    tokens
}

struct Parser<'s, 't> {
    src: &'s str,
    tokens: &'t [Token],
    pos: usize,
    nodes: Arena<RawNode>,
    order: Vec<NodeId>,
    roots: Vec<NodeId>,
    errors: Vec<ErrorReport>,
}

impl Parser<'_, '_> {
    fn run(&mut self) {
        while let Some(tok) = self.peek() {
            match tok.tag {
                TokenTag::KeywordTest => self.parse_test(),
                TokenTag::KeywordPub
                | TokenTag::KeywordExtern
                | TokenTag::KeywordExport
                | TokenTag::KeywordFn
                | TokenTag::KeywordConst
                | TokenTag::KeywordVar => self.parse_decl(),
                _ => self.parse_unknown(tok.start),
            }
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_tag(&self) -> Option<TokenTag> {
        self.peek().map(|t| t.tag)
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tag: TokenTag) -> bool {
        if self.peek_tag() == Some(tag) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, tag: TokenTag, message: &str) -> bool {
        if self.eat(tag) {
            return true;
        }
        let offset = self.current_offset();
        self.error(message.to_string(), offset);
        false
    }

    fn expect_span(&mut self, tag: TokenTag, message: &str) -> Option<Span> {
        match self.peek() {
            Some(tok) if tok.tag == tag => {
                self.pos += 1;
                Some(Span {
                    start: tok.start,
                    end: tok.end,
                })
            }
            _ => {
                let offset = self.current_offset();
                self.error(message.to_string(), offset);
                None
            }
        }
    }

    fn current_offset(&self) -> usize {
        self.peek().map(|t| t.start).unwrap_or(self.src.len())
    }

    fn alloc(&mut self, node: RawNode) -> NodeId {
        let id = self.nodes.alloc(node);
        self.order.push(id);
        id
    }

    fn error(&mut self, message: String, offset: usize) {
        let before = &self.src[..offset.min(self.src.len())];
        let line = before.matches('\n').count() + 1;
        let column = offset - before.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;
        self.errors.push(ErrorReport {
            message,
            offset,
            line,
            column,
        });
    }

    /// Skips to the next plausible top-level anchor after a malformed
    /// declaration.
    fn recover(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok.tag {
                TokenTag::Semicolon if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                TokenTag::KeywordTest
                | TokenTag::KeywordPub
                | TokenTag::KeywordFn
                | TokenTag::KeywordConst
                | TokenTag::KeywordVar
                    if depth == 0 =>
                {
                    return;
                }
                TokenTag::LBrace | TokenTag::LParen | TokenTag::LBracket => {
                    depth += 1;
                    self.pos += 1;
                }
                TokenTag::RBrace | TokenTag::RParen | TokenTag::RBracket => {
                    if depth == 0 {
                        self.pos += 1;
                        return;
                    }
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 && tok.tag == TokenTag::RBrace {
                        return;
                    }
                }
                _ => {
                    self.pos += 1;
                }
            }
        }
    }

    /// Consumes an unmodelled top-level construct and files it as `Unknown`.
    fn parse_unknown(&mut self, start: usize) {
        let mut depth = 0usize;
        let mut end = start;
        while let Some(tok) = self.peek() {
            match tok.tag {
                TokenTag::Semicolon if depth == 0 => {
                    self.pos += 1;
                    end = tok.end;
                    break;
                }
                TokenTag::LBrace | TokenTag::LParen | TokenTag::LBracket => {
                    depth += 1;
                    self.pos += 1;
                    end = tok.end;
                }
                TokenTag::RBrace | TokenTag::RParen | TokenTag::RBracket => {
                    self.pos += 1;
                    end = tok.end;
                    if depth <= 1 {
                        if depth == 1 && tok.tag == TokenTag::RBrace {
                            break;
                        }
                        if depth == 0 {
                            break;
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                _ => {
                    self.pos += 1;
                    end = tok.end;
                }
            }
        }
        let id = self.alloc(RawNode::new(NodeTag::Unknown, Span { start, end }));
        self.roots.push(id);
    }

    /// Consumes a balanced `{ ... }` block; the next token must be `{`.
    fn balanced_block(&mut self, start: usize) -> Span {
        let mut depth = 0usize;
        let mut end = start;
        while let Some(tok) = self.bump() {
            end = tok.end;
            match tok.tag {
                TokenTag::LBrace => depth += 1,
                TokenTag::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Span { start, end };
                    }
                }
                _ => {}
            }
        }
        self.error("unterminated block".to_string(), start);
        Span { start, end }
    }

    fn parse_test(&mut self) {
        let Some(test_kw) = self.bump() else { return };
        let start = test_kw.start;

        let name = match self.peek() {
            Some(tok)
                if tok.tag == TokenTag::StringLiteral || tok.tag == TokenTag::Identifier =>
            {
                self.pos += 1;
                Some(Span {
                    start: tok.start,
                    end: tok.end,
                })
            }
            _ => None,
        };

        match self.peek() {
            Some(tok) if tok.tag == TokenTag::LBrace => {
                let body = self.balanced_block(tok.start);
                let mut node = RawNode::new(
                    NodeTag::TestDecl,
                    Span {
                        start,
                        end: body.end,
                    },
                );
                node.name = name;
                node.body = Some(body);
                let id = self.alloc(node);
                self.roots.push(id);
            }
            _ => {
                let offset = self.current_offset();
                self.error("expected block after 'test'".to_string(), offset);
                self.recover();
            }
        }
    }

    fn parse_decl(&mut self) {
        let start = self.current_offset();
        let mut flags = Modifiers::default();
        loop {
            match self.peek_tag() {
                Some(TokenTag::KeywordPub) => {
                    flags.is_public = true;
                    self.pos += 1;
                }
                Some(TokenTag::KeywordExtern) => {
                    flags.is_extern = true;
                    self.pos += 1;
                    // optional ABI string, e.g. extern "c"
                    self.eat(TokenTag::StringLiteral);
                }
                Some(TokenTag::KeywordExport) => {
                    flags.is_export = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }

        match self.peek_tag() {
            Some(TokenTag::KeywordFn) => self.parse_fn(start, flags),
            Some(TokenTag::KeywordConst) => {
                self.pos += 1;
                flags.is_const = true;
                self.parse_var(start, flags);
            }
            Some(TokenTag::KeywordVar) => {
                self.pos += 1;
                self.parse_var(start, flags);
            }
            _ => self.parse_unknown(start),
        }
    }

    fn parse_fn(&mut self, start: usize, flags: Modifiers) {
        self.pos += 1; // fn
        let Some(name) = self.expect_span(TokenTag::Identifier, "expected function name") else {
            self.recover();
            return;
        };
        if !self.expect(TokenTag::LParen, "expected '(' after function name") {
            self.recover();
            return;
        }

        let mut params = Vec::new();
        loop {
            match self.peek_tag() {
                None => {
                    let offset = self.current_offset();
                    self.error("unterminated parameter list".to_string(), offset);
                    self.recover();
                    return;
                }
                Some(TokenTag::RParen) => {
                    self.pos += 1;
                    break;
                }
                _ => {
                    let is_comptime = self.eat(TokenTag::KeywordComptime);
                    let Some(pname) =
                        self.expect_span(TokenTag::Identifier, "expected parameter name")
                    else {
                        self.recover();
                        return;
                    };
                    if !self.expect(TokenTag::Colon, "expected ':' after parameter name") {
                        self.recover();
                        return;
                    }
                    let type_node = self.parse_type();
                    params.push(RawParam {
                        name: pname,
                        type_node,
                        is_comptime,
                    });
                    self.eat(TokenTag::Comma);
                }
            }
        }

        let return_type = self.parse_type();
        let (tag, body, end) = match self.peek() {
            Some(tok) if tok.tag == TokenTag::LBrace => {
                let body = self.balanced_block(tok.start);
                (NodeTag::FnDecl, Some(body), body.end)
            }
            Some(tok) if tok.tag == TokenTag::Semicolon => {
                self.pos += 1;
                (NodeTag::FnProto, None, tok.end)
            }
            _ => {
                let offset = self.current_offset();
                self.error("expected function body or ';'".to_string(), offset);
                self.recover();
                return;
            }
        };

        let mut node = RawNode::new(tag, Span { start, end });
        node.name = Some(name);
        node.type_node = Some(return_type);
        node.body = body;
        node.params = params;
        node.flags = flags;
        let id = self.alloc(node);
        self.roots.push(id);
    }

    fn parse_var(&mut self, start: usize, flags: Modifiers) {
        let Some(name) = self.expect_span(TokenTag::Identifier, "expected variable name") else {
            self.recover();
            return;
        };

        let mut type_node = None;
        if self.eat(TokenTag::Colon) {
            type_node = Some(self.parse_type());
        }

        let mut align = None;
        if self.eat(TokenTag::KeywordAlign) {
            if !self.expect(TokenTag::LParen, "expected '(' after 'align'") {
                self.recover();
                return;
            }
            align = Some(self.paren_contents());
        }

        let mut value = None;
        if self.eat(TokenTag::Equal) {
            value = Some(self.span_until_semicolon());
        }

        let end = match self.peek() {
            Some(tok) if tok.tag == TokenTag::Semicolon => {
                self.pos += 1;
                tok.end
            }
            _ => {
                let offset = self.current_offset();
                self.error("expected ';' after variable declaration".to_string(), offset);
                self.recover();
                return;
            }
        };

        let tag = match (type_node.is_some(), align.is_some()) {
            (true, true) => NodeTag::GlobalVarDecl,
            (false, true) => NodeTag::AlignedVarDecl,
            _ => NodeTag::SimpleVarDecl,
        };
        let mut node = RawNode::new(tag, Span { start, end });
        node.name = Some(name);
        node.type_node = type_node;
        node.value = value;
        node.align = align;
        node.flags = flags;
        let id = self.alloc(node);
        self.roots.push(id);
    }

    /// Captures the contents of a parenthesized expression; the opening `(`
    /// has already been consumed. Consumes through the matching `)`.
    fn paren_contents(&mut self) -> Span {
        let start = self.current_offset();
        let mut end = start;
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok.tag {
                TokenTag::RParen if depth == 0 => {
                    self.pos += 1;
                    return Span { start, end };
                }
                TokenTag::LParen | TokenTag::LBracket | TokenTag::LBrace => depth += 1,
                TokenTag::RParen | TokenTag::RBracket | TokenTag::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.pos += 1;
            end = tok.end;
        }
        self.error("unterminated parenthesized expression".to_string(), start);
        Span { start, end }
    }

    /// Captures raw source until a `;` at nesting depth zero, not consuming
    /// the `;` itself.
    fn span_until_semicolon(&mut self) -> Span {
        let start = self.current_offset();
        let mut end = start;
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok.tag {
                TokenTag::Semicolon if depth == 0 => break,
                TokenTag::LBrace | TokenTag::LParen | TokenTag::LBracket => depth += 1,
                TokenTag::RBrace | TokenTag::RParen | TokenTag::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.pos += 1;
            end = tok.end;
        }
        Span { start, end }
    }

    fn parse_type(&mut self) -> NodeId {
        let error_union = self.eat(TokenTag::Bang);
        self.parse_type_inner(error_union, false)
    }

    /// Recursive descent over type syntax. `error_union` and `is_const` are
    /// leaf properties carried down through wrapper layers.
    fn parse_type_inner(&mut self, error_union: bool, is_const: bool) -> NodeId {
        let start = self.current_offset();
        match self.peek_tag() {
            Some(TokenTag::Question) => {
                self.pos += 1;
                let inner = self.parse_type_inner(error_union, is_const);
                let end = self.nodes[inner].span.end;
                let mut node = RawNode::new(NodeTag::OptionalType, Span { start, end });
                node.type_node = Some(inner);
                self.alloc(node)
            }
            Some(TokenTag::Asterisk) => {
                self.pos += 1;
                let pointee_const = self.eat(TokenTag::KeywordConst);
                let inner = self.parse_type_inner(error_union, is_const || pointee_const);
                let end = self.nodes[inner].span.end;
                let mut node = RawNode::new(NodeTag::PtrType, Span { start, end });
                node.type_node = Some(inner);
                self.alloc(node)
            }
            Some(TokenTag::LBracket) => {
                self.pos += 1;
                let length = self.bracket_contents();
                let element_const = self.eat(TokenTag::KeywordConst);
                let inner = self.parse_type_inner(error_union, is_const || element_const);
                let end = self.nodes[inner].span.end;
                let mut node = RawNode::new(NodeTag::ArrayType, Span { start, end });
                node.type_node = Some(inner);
                node.body = Some(length);
                self.alloc(node)
            }
            Some(TokenTag::Identifier) => match self.bump() {
                Some(tok) => {
                    let span = Span {
                        start: tok.start,
                        end: tok.end,
                    };
                    let mut node = RawNode::new(NodeTag::Identifier, span);
                    node.name = Some(span);
                    node.flags.is_const = is_const;
                    node.is_error_union = error_union;
                    self.alloc(node)
                }
                None => self.alloc(RawNode::new(NodeTag::Unknown, Span { start, end: start })),
            },
            Some(TokenTag::KeywordConst) => {
                self.pos += 1;
                self.parse_type_inner(error_union, true)
            }
            Some(
                TokenTag::KeywordStruct
                | TokenTag::KeywordEnum
                | TokenTag::KeywordUnion
                | TokenTag::KeywordOpaque,
            ) => self.parse_container_type(error_union),
            _ => {
                let end = self.skip_type_tokens(start);
                self.alloc(RawNode::new(NodeTag::Unknown, Span { start, end }))
            }
        }
    }

    fn parse_container_type(&mut self, error_union: bool) -> NodeId {
        let Some(kw) = self.bump() else {
            let end = self.src.len();
            return self.alloc(RawNode::new(NodeTag::Unknown, Span { start: end, end }));
        };
        let kind = match kw.tag {
            TokenTag::KeywordEnum => ContainerKind::Enum,
            TokenTag::KeywordUnion => ContainerKind::Union,
            TokenTag::KeywordOpaque => ContainerKind::Opaque,
            _ => ContainerKind::Struct,
        };

        let mut end = kw.end;
        // optional backing type, e.g. enum(u8)
        if self.peek_tag() == Some(TokenTag::LParen) {
            self.pos += 1;
            let _ = self.paren_contents();
            if let Some(prev) = self.tokens.get(self.pos - 1) {
                end = prev.end;
            }
        }
        if let Some(tok) = self.peek() {
            if tok.tag == TokenTag::LBrace {
                let body = self.balanced_block(tok.start);
                end = body.end;
            }
        }

        let mut node = RawNode::new(
            NodeTag::ContainerDecl,
            Span {
                start: kw.start,
                end,
            },
        );
        node.container = Some(kind);
        node.is_error_union = error_union;
        self.alloc(node)
    }

    /// Captures the contents of `[ ... ]`; the opening `[` has already been
    /// consumed. Consumes through the matching `]`.
    fn bracket_contents(&mut self) -> Span {
        let start = self.current_offset();
        let mut end = start;
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok.tag {
                TokenTag::RBracket if depth == 0 => {
                    self.pos += 1;
                    return Span { start, end };
                }
                TokenTag::LParen | TokenTag::LBracket | TokenTag::LBrace => depth += 1,
                TokenTag::RParen | TokenTag::RBracket | TokenTag::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.pos += 1;
            end = tok.end;
        }
        self.error("unterminated array length".to_string(), start);
        Span { start, end }
    }

    /// Consumes an unmodelled type expression up to the next terminator at
    /// nesting depth zero.
    fn skip_type_tokens(&mut self, start: usize) -> usize {
        let mut depth = 0usize;
        let mut end = start;
        while let Some(tok) = self.peek() {
            match tok.tag {
                TokenTag::Comma
                | TokenTag::RParen
                | TokenTag::LBrace
                | TokenTag::Semicolon
                | TokenTag::Equal
                    if depth == 0 =>
                {
                    break;
                }
                TokenTag::LParen | TokenTag::LBracket => depth += 1,
                TokenTag::RParen | TokenTag::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.pos += 1;
            end = tok.end;
        }
        end
    }
}
