//! STL decoding (binary and ASCII)
//!
//! Binary STL is 80 header bytes, a little-endian triangle count, then 50
//! bytes per triangle (normal, three vertices, attribute word). Some
//! exporters pack per-face color into the attribute word and a default
//! color plus shared alpha into the header behind a `COLOR=` marker; both
//! are surfaced as per-vertex RGBA.

use tracing::debug;

use crate::error::AssetError;
use crate::mesh::MeshData;

const HEADER_LEN: usize = 80;
const TRIANGLE_LEN: usize = 50;

/// Decode an STL file into a single surface mesh.
pub fn decode_stl(source: &str, bytes: &[u8]) -> Result<MeshData, AssetError> {
    if looks_binary(bytes) {
        decode_binary(source, bytes)
    } else {
        decode_ascii(source, bytes)
    }
}

fn looks_binary(bytes: &[u8]) -> bool {
    if bytes.len() < HEADER_LEN + 4 {
        return false;
    }
    let count = read_u32(bytes, HEADER_LEN) as usize;
    bytes.len() == HEADER_LEN + 4 + count * TRIANGLE_LEN
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn read_vec3(bytes: &[u8], offset: usize) -> [f32; 3] {
    [
        read_f32(bytes, offset),
        read_f32(bytes, offset + 4),
        read_f32(bytes, offset + 8),
    ]
}

/// Default color and shared alpha from a `COLOR=rgba` header marker.
fn header_color(header: &[u8]) -> Option<[f32; 4]> {
    header.windows(6).position(|w| w == b"COLOR=").map(|i| {
        let at = |o: usize| header.get(i + 6 + o).copied().unwrap_or(255) as f32 / 255.0;
        [at(0), at(1), at(2), at(3)]
    })
}

fn decode_binary(source: &str, bytes: &[u8]) -> Result<MeshData, AssetError> {
    let count = read_u32(bytes, HEADER_LEN) as usize;
    let default_color = header_color(&bytes[..HEADER_LEN]);

    let mut positions = Vec::with_capacity(count * 3);
    let mut normals = Vec::with_capacity(count * 3);
    let mut colors = default_color.map(|_| Vec::with_capacity(count * 3));

    for t in 0..count {
        let base = HEADER_LEN + 4 + t * TRIANGLE_LEN;
        let normal = read_vec3(bytes, base);
        for v in 0..3 {
            positions.push(read_vec3(bytes, base + 12 + v * 12));
            normals.push(normal);
        }

        if let (Some(colors), Some(default)) = (colors.as_mut(), default_color) {
            let packed = read_u16(bytes, base + 48);
            // Attribute bit 15 clear means the face carries its own 5-bit
            // channels; otherwise the header default applies.
            let face = if packed & 0x8000 == 0 {
                [
                    (packed & 0x1F) as f32 / 31.0,
                    ((packed >> 5) & 0x1F) as f32 / 31.0,
                    ((packed >> 10) & 0x1F) as f32 / 31.0,
                    default[3],
                ]
            } else {
                default
            };
            colors.extend([face; 3]);
        }
    }

    if positions.is_empty() {
        return Err(AssetError::NoRenderableMesh(source.to_string()));
    }

    debug!(
        "STL '{}': {} triangles{}",
        source,
        count,
        if colors.is_some() { ", per-vertex color" } else { "" }
    );

    Ok(MeshData {
        positions,
        normals: Some(normals),
        colors,
        indices: None,
    })
}

fn decode_ascii(source: &str, bytes: &[u8]) -> Result<MeshData, AssetError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| AssetError::DecodeFailed(source.to_string(), e.to_string()))?;
    if !text.trim_start().starts_with("solid") {
        return Err(AssetError::DecodeFailed(
            source.to_string(),
            "not an STL file".to_string(),
        ));
    }

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut facet_normal = [0.0f32; 3];

    let mut tokens = text.split_whitespace();
    while let Some(token) = tokens.next() {
        let mut read3 = |what: &str| -> Result<[f32; 3], AssetError> {
            let mut out = [0.0f32; 3];
            for item in &mut out {
                let tok = tokens.next().ok_or_else(|| {
                    AssetError::DecodeFailed(
                        source.to_string(),
                        format!("truncated {what} triple"),
                    )
                })?;
                *item = tok.parse::<f32>().map_err(|e| {
                    AssetError::DecodeFailed(source.to_string(), e.to_string())
                })?;
            }
            Ok(out)
        };

        match token {
            "normal" => facet_normal = read3("normal")?,
            "vertex" => {
                positions.push(read3("vertex")?);
                normals.push(facet_normal);
            }
            _ => {}
        }
    }

    if positions.is_empty() {
        return Err(AssetError::NoRenderableMesh(source.to_string()));
    }

    debug!("STL '{}': {} triangles (ascii)", source, positions.len() / 3);

    Ok(MeshData {
        positions,
        normals: Some(normals),
        colors: None,
        indices: None,
    })
}
