//! Start/end-tag and attribute parsing (§4.7 "Element parsing" /
//! "Attribute parsing" / "End-tag matching").

use super::{Parser, Pending, StackFrame};
use crate::chars::is_name_char;
use crate::decode::ByteSource;
use crate::error::{Error, ErrorCode};
use crate::name::split_qname;
use crate::namespace::{validate_binding, BindingError};
use crate::node::{Attribute, NodeKind};

/// One attribute exactly as written, before namespace resolution: a
/// `xmlns`/`xmlns:*` declaration is applied to the element's frame as
/// soon as it is seen, but its own exposed namespace URI (and every plain
/// attribute's) can only be finalized once every declaration on this
/// element has been collected.
struct RawAttr {
    raw_name: String,
    prefix: Option<String>,
    local_name: String,
    qualified_name: String,
    value: String,
    is_default_decl: bool,
    row: u64,
    column: u64,
}

impl<S: ByteSource> Parser<S> {
    /// Consumes a `Name` starting at the current cursor, returning it along
    /// with the position of its first character. Caller must already have
    /// peeked a `NameStartChar` there.
    fn parse_name(&mut self) -> Result<(String, u64, u64), Error> {
        let row = self.position_current_row();
        let column = self.position_current_column();
        let mut name = String::new();
        loop {
            match self.peek_cp()? {
                Some(cp) if is_name_char(cp) => {
                    name.push(char::from_u32(cp).expect("validated by the decoder"));
                    self.next_cp()?;
                }
                _ => break,
            }
        }
        Ok((name, row, column))
    }

    fn position_current_row(&self) -> u64 {
        self.current_position().0
    }

    fn position_current_column(&self) -> u64 {
        self.current_position().1
    }

    fn current_position(&self) -> (u64, u64) {
        (self.position.current_row(), self.position.current_column())
    }

    fn skip_whitespace(&mut self) -> Result<bool, Error> {
        let mut any = false;
        while let Some(cp) = self.peek_cp()? {
            if !crate::chars::is_whitespace(cp) {
                break;
            }
            self.next_cp()?;
            any = true;
        }
        Ok(any)
    }

    pub(super) fn parse_start_or_empty_element(
        &mut self,
        tag_row: u64,
        tag_column: u64,
    ) -> Result<bool, Error> {
        if self.stack.is_empty() && self.root_seen {
            return Err(Error::new(
                ErrorCode::InvalidSyntax,
                "a document may have only one root element",
                tag_row,
                tag_column,
            ));
        }

        let (raw_name, name_row, name_column) = self.parse_name()?;
        let qname = split_qname(&raw_name).ok_or_else(|| {
            Error::new(
                ErrorCode::InvalidTagName,
                format!("\"{}\" is not a legal element name", raw_name),
                name_row,
                name_column,
            )
        })?;
        if qname.prefix.as_deref() == Some("xmlns") {
            return Err(Error::new(
                ErrorCode::PrefixWithoutAssignedNamespace,
                "the prefix \"xmlns\" may not be used on an element name",
                name_row,
                name_column,
            ));
        }

        self.namespaces.push_frame();
        let mut raw_attrs: Vec<RawAttr> = Vec::new();

        loop {
            let saw_space = self.skip_whitespace()?;
            match self.peek_cp()? {
                Some(cp) if cp == '>' as u32 => {
                    self.next_cp()?;
                    break;
                }
                Some(cp) if cp == '/' as u32 => {
                    self.next_cp()?;
                    match self.peek_cp()? {
                        Some(cp) if cp == '>' as u32 => {
                            self.next_cp()?;
                            return self.finish_empty_element(
                                qname.prefix,
                                qname.local_name,
                                raw_name,
                                raw_attrs,
                                tag_row,
                                tag_column,
                                name_row,
                                name_column,
                            );
                        }
                        _ => {
                            return Err(self.error_here(
                                ErrorCode::InvalidSyntax,
                                "expected '>' after '/'",
                            ))
                        }
                    }
                }
                Some(cp) if crate::chars::is_name_start_char(cp) => {
                    if !saw_space {
                        return Err(self.error_here(
                            ErrorCode::InvalidSyntax,
                            "expected whitespace before an attribute name",
                        ));
                    }
                    let attr = self.parse_attribute()?;
                    raw_attrs.push(attr);
                }
                Some(_) => {
                    return Err(self.error_here(
                        ErrorCode::InvalidSyntax,
                        "expected an attribute name, '/' or '>'",
                    ))
                }
                None => {
                    return Err(self.error_here(
                        ErrorCode::UnclosedToken,
                        "start-tag was not closed before end of input",
                    ))
                }
            }
        }

        self.finish_start_element(
            qname.prefix,
            qname.local_name,
            raw_name,
            raw_attrs,
            tag_row,
            tag_column,
            name_row,
            name_column,
        )
    }

    fn parse_attribute(&mut self) -> Result<RawAttr, Error> {
        let (raw_name, row, column) = self.parse_name()?;
        self.skip_whitespace()?;
        match self.peek_cp()? {
            Some(cp) if cp == '=' as u32 => {
                self.next_cp()?;
            }
            _ => return Err(self.error_here(ErrorCode::InvalidSyntax, "expected '=' after attribute name")),
        }
        self.skip_whitespace()?;
        let quote = match self.peek_cp()? {
            Some(cp) if cp == '\'' as u32 || cp == '"' as u32 => cp,
            _ => {
                return Err(self.error_here(
                    ErrorCode::InvalidSyntax,
                    "expected a quoted attribute value",
                ))
            }
        };
        self.next_cp()?;
        let value = self.parse_attribute_value(quote)?;

        let qname = split_qname(&raw_name).ok_or_else(|| {
            Error::new(
                ErrorCode::InvalidTagName,
                format!("\"{}\" is not a legal attribute name", raw_name),
                row,
                column,
            )
        })?;

        let is_default_decl = raw_name == "xmlns";
        let is_prefixed_decl = qname.prefix.as_deref() == Some("xmlns");

        if is_default_decl || is_prefixed_decl {
            let target_prefix = if is_default_decl {
                None
            } else {
                Some(qname.local_name.as_str())
            };
            validate_binding(target_prefix, &value).map_err(|e| {
                Error::new(ErrorCode::PrefixWithoutAssignedNamespace, binding_error_message(e), row, column)
            })?;
            self.namespaces
                .declare(target_prefix.map(str::to_string), value.clone());
        }

        Ok(RawAttr {
            qualified_name: qname.qualified(),
            prefix: qname.prefix,
            local_name: qname.local_name,
            raw_name,
            value,
            is_default_decl,
            row,
            column,
        })
    }

    /// Scans a quoted attribute value, applying literal-whitespace
    /// normalization (tab/CR/LF -> single space) and resolving entity and
    /// character references inline.
    fn parse_attribute_value(&mut self, quote: u32) -> Result<String, Error> {
        let mut value = String::new();
        loop {
            match self.peek_cp()? {
                None => {
                    return Err(self.error_here(
                        ErrorCode::UnclosedToken,
                        "attribute value was not closed before end of input",
                    ))
                }
                Some(cp) if cp == quote => {
                    self.next_cp()?;
                    break;
                }
                Some(cp) if cp == '<' as u32 => {
                    return Err(self.error_here(
                        ErrorCode::InvalidSyntax,
                        "'<' is not allowed inside an attribute value",
                    ))
                }
                Some(cp) if cp == '&' as u32 => {
                    let (_, resolved) = self.read_entity_reference_raw()?;
                    value.push(char::from_u32(resolved).expect("validated by entity resolution"));
                }
                Some(cp) if cp == 0x09 || cp == 0x0A => {
                    // CR was already folded into 0x0A by the line-end normalizer.
                    self.next_cp()?;
                    value.push(' ');
                }
                Some(cp) => {
                    value.push(char::from_u32(cp).expect("validated by the decoder"));
                    self.next_cp()?;
                }
            }
        }
        Ok(value)
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_attributes(
        &mut self,
        raw_attrs: Vec<RawAttr>,
    ) -> Result<Vec<Attribute>, Error> {
        let mut attrs = Vec::with_capacity(raw_attrs.len());
        let mut seen: Vec<(String, String)> = Vec::with_capacity(raw_attrs.len());
        for raw in raw_attrs {
            let namespace_uri = if raw.is_default_decl {
                String::new()
            } else if raw.prefix.as_deref() == Some("xmlns") {
                crate::namespace::XMLNS_URI.to_string()
            } else {
                match raw.prefix.as_deref() {
                    None => String::new(),
                    Some(p) => self
                        .namespaces
                        .resolve_attribute(Some(p))
                        .map(str::to_string)
                        .ok_or_else(|| {
                            Error::new(
                                ErrorCode::PrefixWithoutAssignedNamespace,
                                format!("attribute prefix \"{}\" has no assigned namespace", p),
                                raw.row,
                                raw.column,
                            )
                        })?,
                }
            };
            let key = (namespace_uri.clone(), raw.local_name.clone());
            if seen.contains(&key) {
                return Err(Error::new(
                    ErrorCode::InvalidSyntax,
                    format!("duplicate attribute \"{}\"", raw.qualified_name),
                    raw.row,
                    raw.column,
                ));
            }
            seen.push(key);
            attrs.push(Attribute {
                prefix: raw.prefix,
                local_name: raw.local_name,
                qualified_name: raw.qualified_name,
                namespace_uri,
                value: raw.value,
            });
        }
        Ok(attrs)
    }

    fn resolve_element_namespace(
        &self,
        prefix: Option<&str>,
        name_row: u64,
        name_column: u64,
    ) -> Result<String, Error> {
        match prefix {
            None => Ok(self.namespaces.resolve_element(None).unwrap_or("").to_string()),
            Some(p) => self
                .namespaces
                .resolve_element(Some(p))
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::new(
                        ErrorCode::PrefixWithoutAssignedNamespace,
                        format!("element prefix \"{}\" has no assigned namespace", p),
                        name_row,
                        name_column,
                    )
                }),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_start_element(
        &mut self,
        prefix: Option<String>,
        local_name: String,
        qualified_name: String,
        raw_attrs: Vec<RawAttr>,
        tag_row: u64,
        tag_column: u64,
        name_row: u64,
        name_column: u64,
    ) -> Result<bool, Error> {
        let namespace_uri = self.resolve_element_namespace(prefix.as_deref(), name_row, name_column)?;
        let attributes = self.resolve_attributes(raw_attrs)?;
        let depth = self.depth();

        self.stack.push(StackFrame {
            qualified_name: qualified_name.clone(),
            prefix: prefix.clone(),
            local_name: local_name.clone(),
            row: tag_row,
            column: tag_column,
        });
        self.root_seen = true;

        self.node.reset();
        self.node.kind = NodeKind::StartElement;
        self.node.name = qualified_name;
        self.node.prefix = prefix;
        self.node.local_name = local_name;
        self.node.namespace_uri = namespace_uri;
        self.node.attributes = attributes;
        self.node.row = tag_row;
        self.node.column = tag_column;
        self.node.depth = depth;
        Ok(true)
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_empty_element(
        &mut self,
        prefix: Option<String>,
        local_name: String,
        qualified_name: String,
        raw_attrs: Vec<RawAttr>,
        tag_row: u64,
        tag_column: u64,
        name_row: u64,
        name_column: u64,
    ) -> Result<bool, Error> {
        let namespace_uri = self.resolve_element_namespace(prefix.as_deref(), name_row, name_column)?;
        let attributes = self.resolve_attributes(raw_attrs)?;
        let depth = self.depth();
        self.namespaces.pop_frame();
        self.root_seen = true;

        self.pending = Some(Pending::EndElement {
            qualified_name: qualified_name.clone(),
            prefix: prefix.clone(),
            local_name: local_name.clone(),
            namespace_uri: namespace_uri.clone(),
            depth,
            row: tag_row,
            column: tag_column,
        });

        self.node.reset();
        self.node.kind = NodeKind::EmptyElement;
        self.node.name = qualified_name;
        self.node.prefix = prefix;
        self.node.local_name = local_name;
        self.node.namespace_uri = namespace_uri;
        self.node.attributes = attributes;
        self.node.row = tag_row;
        self.node.column = tag_column;
        self.node.depth = depth;
        Ok(true)
    }

    pub(super) fn parse_end_tag(&mut self, tag_row: u64, tag_column: u64) -> Result<bool, Error> {
        self.next_cp()?; // consume '/'
        let (raw_name, name_row, name_column) = self.parse_name()?;
        if raw_name.is_empty() {
            return Err(Error::new(
                ErrorCode::InvalidTagName,
                "an end-tag must name the element it closes",
                name_row,
                name_column,
            ));
        }
        self.skip_whitespace()?;
        match self.peek_cp()? {
            Some(cp) if cp == '>' as u32 => {
                self.next_cp()?;
            }
            _ => {
                return Err(self.error_here(ErrorCode::InvalidSyntax, "expected '>' to close the end-tag"))
            }
        }

        let top = match self.stack.last() {
            Some(top) => top,
            None => {
                return Err(Error::new(
                    ErrorCode::UnexpectedEndTag,
                    format!("end-tag </{}> has no matching open element", raw_name),
                    tag_row,
                    tag_column,
                ))
            }
        };
        if top.qualified_name != raw_name {
            return Err(Error::new(
                ErrorCode::UnclosedTag,
                format!("element <{}> was never closed", top.qualified_name),
                top.row,
                top.column,
            ));
        }

        // Resolve the closing element's namespace before popping its own
        // binding scope: an unprefixed name may depend on a default
        // namespace it declared on itself.
        let namespace_uri = match self.namespaces.resolve_element(top.prefix.as_deref()) {
            Some(uri) => uri.to_string(),
            None => String::new(),
        };
        let frame = self.stack.pop().expect("checked non-empty above");
        self.namespaces.pop_frame();
        let depth = self.depth();

        self.node.reset();
        self.node.kind = NodeKind::EndElement;
        self.node.name = frame.qualified_name;
        self.node.prefix = frame.prefix;
        self.node.local_name = frame.local_name;
        self.node.namespace_uri = namespace_uri;
        self.node.row = tag_row;
        self.node.column = tag_column;
        self.node.depth = depth;
        Ok(true)
    }
}

fn binding_error_message(err: BindingError) -> String {
    err.to_string()
}
