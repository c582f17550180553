//! Binary frame codec

use crate::error::{ClientError, ClientResult};
use crate::task::{Task, TaskKind};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Magic bytes at the start of every request and response
pub const EYE_CATCHER: &[u8; 4] = b"LLM1";

/// Largest token payload; the length prefix is a single byte
pub const MAX_TOKEN_LEN: usize = u8::MAX as usize;

/// Tag byte plus 32-bit length
const CHUNK_HEADER_LEN: usize = 5;

/// Eye-catcher, `BeginOfRequest` and task-kind id
const REQUEST_HEADER_LEN: usize = 6;

/// Type of a chunk in a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChunkType {
    BeginOfRequest = 0x01,
    EndOfRequest = 0x02,
    CloseConnection = 0x03,
    SystemPrompt = 0x04,
    Prompt = 0x05,
    FimBefore = 0x06,
    FimAfter = 0x07,
}

impl ChunkType {
    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0x01 => Some(Self::BeginOfRequest),
            0x02 => Some(Self::EndOfRequest),
            0x03 => Some(Self::CloseConnection),
            0x04 => Some(Self::SystemPrompt),
            0x05 => Some(Self::Prompt),
            0x06 => Some(Self::FimBefore),
            0x07 => Some(Self::FimAfter),
            _ => None,
        }
    }

    /// Control tags travel as a single raw byte: no length, no payload
    pub const fn is_control(self) -> bool {
        matches!(
            self,
            Self::BeginOfRequest | Self::EndOfRequest | Self::CloseConnection
        )
    }
}

/// A decoded length-prefixed chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub chunk_type: ChunkType,
    pub payload: Bytes,
}

impl Chunk {
    /// Payload as UTF-8 text
    pub fn text(&self) -> ClientResult<&str> {
        Ok(std::str::from_utf8(&self.payload)?)
    }
}

/// One frame of the response token stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenFrame {
    Token(String),
    /// Zero-length frame: no further tokens follow
    End,
}

impl TokenFrame {
    /// Build a frame from its length byte and the `len` payload bytes.
    ///
    /// Token bytes are decoded lossily: a multi-byte character split across
    /// two tokens yields replacement characters instead of failing the request.
    pub fn from_parts(len: u8, payload: &[u8]) -> Self {
        if len == 0 {
            Self::End
        } else {
            Self::Token(String::from_utf8_lossy(payload).into_owned())
        }
    }
}

fn eye_catcher_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Check four bytes against [`EYE_CATCHER`]
pub(crate) fn check_eye_catcher(bytes: &[u8]) -> ClientResult<()> {
    if bytes != EYE_CATCHER {
        return Err(ClientError::protocol(format!(
            "Invalid eye-catcher: {}",
            eye_catcher_text(bytes)
        )));
    }
    Ok(())
}

/// Append a framed chunk: tag, big-endian u32 length, payload
pub fn encode_chunk(dst: &mut BytesMut, chunk_type: ChunkType, payload: &[u8]) -> ClientResult<()> {
    if chunk_type.is_control() {
        return Err(ClientError::protocol(format!(
            "{:?} is a control byte, not a framed chunk",
            chunk_type
        )));
    }
    let len = u32::try_from(payload.len()).map_err(|_| {
        ClientError::protocol(format!(
            "Chunk payload of {} bytes exceeds the 32-bit length field",
            payload.len()
        ))
    })?;

    dst.reserve(CHUNK_HEADER_LEN + payload.len());
    dst.put_u8(chunk_type.id());
    dst.put_u32(len);
    dst.put_slice(payload);
    Ok(())
}

/// Append a raw control byte
pub fn encode_control(dst: &mut BytesMut, chunk_type: ChunkType) -> ClientResult<()> {
    if !chunk_type.is_control() {
        return Err(ClientError::protocol(format!(
            "{:?} is a framed chunk, not a control byte",
            chunk_type
        )));
    }
    dst.put_u8(chunk_type.id());
    Ok(())
}

/// Decode one framed chunk.
///
/// Returns `Ok(None)` without consuming anything while the chunk is incomplete.
pub fn decode_chunk(src: &mut BytesMut) -> ClientResult<Option<Chunk>> {
    let Some(&id) = src.first() else {
        return Ok(None);
    };
    let chunk_type = ChunkType::from_id(id)
        .ok_or_else(|| ClientError::protocol(format!("Unknown chunk type 0x{:02x}", id)))?;
    if chunk_type.is_control() {
        return Err(ClientError::protocol(format!(
            "Unexpected control byte {:?} where a chunk was expected",
            chunk_type
        )));
    }
    if src.len() < CHUNK_HEADER_LEN {
        return Ok(None);
    }

    let len = u32::from_be_bytes([src[1], src[2], src[3], src[4]]) as usize;
    if src.len() < CHUNK_HEADER_LEN + len {
        return Ok(None);
    }

    src.advance(CHUNK_HEADER_LEN);
    let payload = src.split_to(len).freeze();
    Ok(Some(Chunk {
        chunk_type,
        payload,
    }))
}

/// Append one response token.
///
/// Empty tokens are rejected (a zero length ends the stream), as are tokens
/// longer than [`MAX_TOKEN_LEN`] bytes.
pub fn encode_token(dst: &mut BytesMut, token: &str) -> ClientResult<()> {
    let bytes = token.as_bytes();
    if bytes.is_empty() {
        return Err(ClientError::protocol(
            "Empty token cannot be framed: a zero length ends the stream",
        ));
    }
    if bytes.len() > MAX_TOKEN_LEN {
        return Err(ClientError::protocol(format!(
            "Token of {} bytes exceeds the {}-byte frame limit",
            bytes.len(),
            MAX_TOKEN_LEN
        )));
    }
    dst.put_u8(bytes.len() as u8);
    dst.put_slice(bytes);
    Ok(())
}

/// Decode one response token frame from a buffer; `None` until complete
pub fn decode_token(src: &mut BytesMut) -> ClientResult<Option<TokenFrame>> {
    let Some(&len) = src.first() else {
        return Ok(None);
    };
    if src.len() < 1 + len as usize {
        return Ok(None);
    }
    src.advance(1);
    let payload = src.split_to(len as usize);
    Ok(Some(TokenFrame::from_parts(len, &payload)))
}

/// Encode a complete request, up to and including `EndOfRequest`.
///
/// A `SystemPrompt` chunk is always present (empty payload when absent).
/// Prompt tasks carry one `Prompt` chunk, fill-in-middle tasks one
/// `FimBefore` and one `FimAfter` chunk.
pub fn encode_request(task: &Task) -> ClientResult<BytesMut> {
    let mut dst = BytesMut::with_capacity(64);
    dst.put_slice(EYE_CATCHER);
    encode_control(&mut dst, ChunkType::BeginOfRequest)?;
    dst.put_u8(task.kind().wire_id());

    encode_chunk(
        &mut dst,
        ChunkType::SystemPrompt,
        task.system_prompt().unwrap_or_default().as_bytes(),
    )?;

    match task.kind() {
        TaskKind::Prompt => {
            encode_chunk(
                &mut dst,
                ChunkType::Prompt,
                task.prompt_text().unwrap_or_default().as_bytes(),
            )?;
        }
        TaskKind::FillInMiddle => {
            task.validate()?;
            encode_chunk(
                &mut dst,
                ChunkType::FimBefore,
                task.fim_prefix().unwrap_or_default().as_bytes(),
            )?;
            encode_chunk(
                &mut dst,
                ChunkType::FimAfter,
                task.fim_suffix().unwrap_or_default().as_bytes(),
            )?;
        }
    }

    encode_control(&mut dst, ChunkType::EndOfRequest)?;
    Ok(dst)
}

/// Decode a complete request, as a server would.
///
/// Returns `Ok(None)` without consuming anything while the request is
/// incomplete. An empty system prompt decodes to `None`.
pub fn decode_request(src: &mut BytesMut) -> ClientResult<Option<Task>> {
    if src.len() < REQUEST_HEADER_LEN {
        return Ok(None);
    }
    check_eye_catcher(&src[..4])?;
    if src[4] != ChunkType::BeginOfRequest.id() {
        return Err(ClientError::protocol(format!(
            "Expected BeginOfRequest, got 0x{:02x}",
            src[4]
        )));
    }
    let kind = TaskKind::from_wire_id(src[5])
        .ok_or_else(|| ClientError::protocol(format!("Unknown task type-id {}", src[5])))?;

    let mut lookahead = src.clone();
    lookahead.advance(REQUEST_HEADER_LEN);

    let mut system_prompt = None;
    let mut prompt = None;
    let mut prefix = None;
    let mut suffix = None;

    loop {
        let Some(&tag) = lookahead.first() else {
            return Ok(None);
        };
        if tag == ChunkType::EndOfRequest.id() {
            lookahead.advance(1);
            break;
        }
        let Some(chunk) = decode_chunk(&mut lookahead)? else {
            return Ok(None);
        };
        let text = String::from_utf8(chunk.payload.to_vec())?;
        match chunk.chunk_type {
            ChunkType::SystemPrompt => system_prompt = Some(text),
            ChunkType::Prompt => prompt = Some(text),
            ChunkType::FimBefore => prefix = Some(text),
            ChunkType::FimAfter => suffix = Some(text),
            other => {
                return Err(ClientError::protocol(format!(
                    "Unexpected chunk {:?} in request",
                    other
                )));
            }
        }
    }

    let consumed = src.len() - lookahead.len();
    src.advance(consumed);

    let system_prompt = system_prompt.filter(|s| !s.is_empty());
    let task = match kind {
        TaskKind::Prompt => Task::prompt(system_prompt, prompt.unwrap_or_default()),
        TaskKind::FillInMiddle => Task::fill_in_middle(
            system_prompt,
            prefix.ok_or_else(|| ClientError::protocol("FIM request without FimBefore chunk"))?,
            suffix.ok_or_else(|| ClientError::protocol("FIM request without FimAfter chunk"))?,
            prompt,
        ),
    };
    Ok(Some(task))
}

/// Encode a complete response: eye-catcher, tokens, terminating zero
pub fn encode_response<S: AsRef<str>>(tokens: &[S]) -> ClientResult<BytesMut> {
    let mut dst = BytesMut::new();
    dst.put_slice(EYE_CATCHER);
    for token in tokens {
        encode_token(&mut dst, token.as_ref())?;
    }
    dst.put_u8(0);
    Ok(dst)
}
