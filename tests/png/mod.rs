use pngkit::{
  png::*,
  pixel_formats::{RGB8, RGBA8},
  FormatError, PngError, PngErrorKind,
};
use walkdir::WalkDir;

fn fixture(name: &str) -> Vec<u8> {
  std::fs::read(format!("tests/png/files/{name}")).unwrap()
}

#[test]
fn test_RawChunkIter_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    for chunk in RawChunkIter::new(&v) {
      let _ = chunk.verify_crc();
    }
  }
  // even totally random data should never panic the iterator!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    for _ in RawChunkIter::new(&v) {
      //
    }
  }
}

#[test]
fn test_decode_no_panics() {
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(_) => continue,
    };
    let _ = decode(&v);
    let _ = decode_with(&v, &DecodeOptions::lenient());
  }
  for _ in 0..50 {
    let v = super::rand_bytes(1024);
    let _ = decode(&v);
    let mut reader = match ChunkReader::new(&v) {
      Ok(reader) => reader,
      Err(e) => {
        assert_eq!(e, FormatError::BadSignature);
        continue;
      }
    };
    while let Ok(Some(_)) = reader.next_chunk() {}
  }
  // a valid signature in front of garbage should still just be an error.
  for _ in 0..50 {
    let mut v = PNG_SIGNATURE.to_vec();
    v.extend(super::rand_bytes(256));
    assert!(decode(&v).is_err());
  }
}

#[test]
fn test_fixture_gray_1x1() {
  let png = decode(&fixture("gray_1x1.png")).unwrap();
  assert_eq!(png.header, ImageHeader::new(1, 1, 8, ColorType::Grayscale).unwrap());
  assert!(png.palette.is_none());
  assert_eq!(png.image.data(), &[0x7B]);
  assert_eq!(png.to_rgba8().unwrap(), vec![RGBA8 { r: 0x7B, g: 0x7B, b: 0x7B, a: 255 }]);
}

#[test]
fn test_fixture_rgb_with_metadata() {
  let png = decode(&fixture("rgb_3x2.png")).unwrap();
  assert_eq!((png.header.width, png.header.height), (3, 2));
  assert_eq!(png.header.color_type, ColorType::Rgb);
  for y in 0..2 {
    for x in 0..3 {
      let expected = [x * 80, y * 100, 255 - x * 40 - y * 20];
      for (c, e) in expected.iter().enumerate() {
        assert_eq!(png.image.sample(x, y, c), Some(*e as u16), "x={x} y={y} c={c}");
      }
    }
  }
  assert_eq!(png.metadata.gamma, Some(45455));
  assert_eq!(png.metadata.text.len(), 2);
  assert_eq!(png.metadata.text[0].keyword, "Title");
  assert_eq!(png.metadata.text[0].text, "fixture");
  assert_eq!(png.metadata.text[0].kind, TextKind::Plain);
  assert_eq!(png.metadata.text[1].keyword, "Comment");
  assert_eq!(png.metadata.text[1].text, "made by hand");
  assert_eq!(png.metadata.text[1].kind, TextKind::Compressed);
}

#[test]
fn test_fixture_interlaced_palette() {
  let png = decode(&fixture("palette4_9x9_adam7.png")).unwrap();
  assert!(png.header.is_interlaced());
  assert_eq!(png.header.bit_depth, 4);
  let palette = png.palette.as_ref().unwrap();
  assert_eq!(palette.len(), 16);
  assert_eq!(palette.get(3), Some(RGB8 { r: 48, g: 207, b: 24 }));
  assert_eq!(png.metadata.transparency, Some(Transparency::Palette(vec![0, 64, 128, 192])));
  for y in 0..9 {
    for x in 0..9 {
      assert_eq!(png.image.sample(x, y, 0), Some(u16::from((x + 2 * y) as u8 % 16)));
    }
  }
  let rgba = png.to_rgba8().unwrap();
  // (1, 1) has index 3, the last entry with a tRNS alpha.
  assert_eq!(rgba[9 + 1], RGBA8 { r: 48, g: 207, b: 24, a: 192 });
  // (4, 0) has index 4, past the end of the tRNS entries.
  assert_eq!(rgba[4].a, 255);
}

#[test]
fn test_fixture_interlaced_gray16() {
  let png = decode(&fixture("gray16_5x3_adam7.png")).unwrap();
  assert_eq!(png.header.bit_depth, 16);
  for y in 0..3 {
    for x in 0..5 {
      assert_eq!(png.image.sample(x, y, 0), Some((x * 1000 + y * 20000 + 7) as u16));
    }
  }
  // big-endian samples in the raster.
  assert_eq!(&png.image.row(1).unwrap()[..2], &20007_u16.to_be_bytes());
}

#[test]
fn test_fixture_gray_alpha() {
  let png = decode(&fixture("gray_alpha_11x4.png")).unwrap();
  assert_eq!(png.image.stride(), 22);
  for y in 0..4 {
    for x in 0..11 {
      assert_eq!(png.image.sample(x, y, 0), Some(((x * 37 + y * 11) % 256) as u16));
      assert_eq!(png.image.sample(x, y, 1), Some((255 - x * 20) as u16));
    }
  }
}

#[test]
fn test_fixtures_reencode_the_same() {
  for name in [
    "gray_1x1.png",
    "rgb_3x2.png",
    "palette4_9x9_adam7.png",
    "gray16_5x3_adam7.png",
    "gray_alpha_11x4.png",
  ] {
    let png = decode(&fixture(name)).unwrap();
    let options = EncodeOptions::default().with_interlace(png.header.is_interlaced());
    let bytes = png.encode(options).unwrap();
    let again = decode(&bytes).unwrap();
    assert_eq!(again.header, png.header, "{name}");
    assert_eq!(again.image, png.image, "{name}");
    assert_eq!(again.palette, png.palette, "{name}");
    assert_eq!(again.metadata, png.metadata, "{name}");
  }
}

/// Picks a legal image format from random bytes.
fn random_header(r: &[u8]) -> ImageHeader {
  let (color_type, depths): (ColorType, &[u8]) = match r[0] % 5 {
    0 => (ColorType::Grayscale, &[1, 2, 4, 8, 16]),
    1 => (ColorType::Rgb, &[8, 16]),
    2 => (ColorType::Palette, &[1, 2, 4, 8]),
    3 => (ColorType::GrayscaleAlpha, &[8, 16]),
    _ => (ColorType::Rgba, &[8, 16]),
  };
  let bit_depth = depths[usize::from(r[1]) % depths.len()];
  let width = u32::from(r[2] % 40) + 1;
  let height = u32::from(r[3] % 40) + 1;
  let interlace = if r[4] & 1 == 0 { InterlaceMethod::None } else { InterlaceMethod::Adam7 };
  ImageHeader::new(width, height, bit_depth, color_type).unwrap().with_interlace(interlace)
}

#[test]
fn test_random_round_trips() {
  for _ in 0..60 {
    let header = random_header(&super::rand_bytes(5));
    let data = super::rand_bytes(header.raster_len().unwrap());
    let image = RasterImage::new(header, data).unwrap();
    let palette = if header.color_type == ColorType::Palette {
      // a full palette, so every index is in range.
      let entries = super::rand_bytes(3 << header.bit_depth)
        .chunks_exact(3)
        .map(|c| RGB8 { r: c[0], g: c[1], b: c[2] })
        .collect();
      Some(Palette::new(entries).unwrap())
    } else {
      None
    };
    let options = EncodeOptions::default().with_interlace(header.is_interlaced());
    let bytes = encode(&image, palette.as_ref(), &options).unwrap();
    let png = decode(&bytes).unwrap();
    assert_eq!(png.header, header);
    assert_eq!(png.image.data(), image.data(), "{header:?}");
    assert_eq!(png.palette, palette);
  }
}

#[test]
fn test_interlaced_and_progressive_agree() {
  for _ in 0..20 {
    let header = random_header(&super::rand_bytes(5));
    if header.color_type == ColorType::Palette {
      continue;
    }
    let image = RasterImage::new(header, super::rand_bytes(header.raster_len().unwrap())).unwrap();
    let plain = encode(&image, None, &EncodeOptions::default().with_interlace(false)).unwrap();
    let adam7 = encode(&image, None, &EncodeOptions::default().with_interlace(true)).unwrap();
    assert_ne!(plain, adam7);
    let a = decode(&plain).unwrap();
    let b = decode(&adam7).unwrap();
    assert!(!a.header.is_interlaced());
    assert!(b.header.is_interlaced());
    assert_eq!(a.image.data(), b.image.data());
  }
}

#[test]
fn test_adam7_1x1() {
  let header =
    ImageHeader::new(1, 1, 8, ColorType::Rgba).unwrap().with_interlace(InterlaceMethod::Adam7);
  let image = RasterImage::new(header, vec![1, 2, 3, 4]).unwrap();
  let bytes = encode(&image, None, &EncodeOptions::default().with_interlace(true)).unwrap();
  let png = decode(&bytes).unwrap();
  assert!(png.header.is_interlaced());
  assert_eq!(png.image.data(), &[1, 2, 3, 4]);
}

#[test]
fn test_truncated_image_data() {
  let header = ImageHeader::new(64, 64, 8, ColorType::Rgb).unwrap();
  // random pixels don't compress, so the IDAT is large.
  let image = RasterImage::new(header, super::rand_bytes(header.raster_len().unwrap())).unwrap();
  let options = EncodeOptions::default().with_idat_chunk_size(1 << 20);
  let bytes = encode(&image, None, &options).unwrap();
  let idat_start = bytes.windows(4).position(|w| w == b"IDAT").unwrap() + 4;
  for cut in [idat_start + 10, idat_start + 3000, bytes.len() - 30] {
    let err = decode(&bytes[..cut]).unwrap_err();
    assert_eq!(err.kind(), PngErrorKind::Decompression, "cut at {cut}: {err:?}");
  }
}

#[test]
fn test_every_bit_flip_is_caught() {
  let bytes = fixture("gray_1x1.png");
  let mut offset = PNG_SIGNATURE.len();
  for chunk in RawChunkIter::new(&bytes) {
    // the type and data are covered by the CRC, the length isn't.
    let covered = (offset + 4)..(offset + 8 + chunk.data().len());
    for i in covered {
      for bit in 0..8 {
        let mut v = bytes.clone();
        v[i] ^= 1 << bit;
        let err = decode(&v).unwrap_err();
        assert_eq!(err.kind(), PngErrorKind::Integrity, "byte {i} bit {bit}: {err:?}");
      }
    }
    offset += 12 + chunk.data().len();
  }
  assert_eq!(offset, bytes.len());
}

#[test]
fn test_zero_dimensions() {
  for (w, h) in [(0_u32, 1_u32), (1, 0), (0, 0)] {
    let mut ihdr = [0_u8; 13];
    ihdr[0..4].copy_from_slice(&w.to_be_bytes());
    ihdr[4..8].copy_from_slice(&h.to_be_bytes());
    ihdr[8] = 8;
    let mut writer = ChunkWriter::with_signature().unwrap();
    writer.write_chunk(ChunkType::IHDR, &ihdr).unwrap();
    writer.write_chunk(ChunkType::IDAT, &[]).unwrap();
    writer.write_iend().unwrap();
    assert_eq!(
      decode(writer.as_bytes()).unwrap_err(),
      PngError::Format(FormatError::WidthOrHeightZero)
    );
    assert!(read_header(writer.as_bytes()).is_err());
  }
}

#[test]
fn test_iend_crc() {
  let mut writer = ChunkWriter::new();
  writer.write_iend().unwrap();
  assert_eq!(writer.as_bytes(), &[0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);

  let header = ImageHeader::new(2, 2, 1, ColorType::Grayscale).unwrap();
  let image = RasterImage::new(header, vec![0b1000_0000, 0b0100_0000]).unwrap();
  let bytes = encode(&image, None, &EncodeOptions::default()).unwrap();
  let last = RawChunkIter::new(&bytes).last().unwrap();
  assert_eq!(last.ty(), ChunkType::IEND);
  assert_eq!(last.declared_crc(), 0xAE42_6082);
  assert!(bytes.ends_with(&[0xAE, 0x42, 0x60, 0x82]));
}
