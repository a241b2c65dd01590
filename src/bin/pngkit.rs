use pngkit::png::{decode, EncodeOptions, RawChunkIter};

fn main() {
  let mut args = std::env::args().skip(1);
  let mut files: Vec<String> = Vec::new();
  let mut reencode_to: Option<String> = None;
  while let Some(arg) = args.next() {
    if arg == "--reencode" {
      reencode_to = args.next();
      if reencode_to.is_none() {
        println!("`--reencode` needs an output path");
        std::process::exit(1);
      }
    } else {
      files.push(arg);
    }
  }
  if files.is_empty() {
    println!("usage: pngkit [--reencode <out.png>] <file.png>...");
    return;
  }
  for (i, file_arg) in files.iter().enumerate() {
    let path = std::path::Path::new(file_arg);
    print!("Reading `{}`... ", path.display());
    let bytes = match std::fs::read(path) {
      Ok(bytes) => {
        println!("got {} bytes.", bytes.len());
        bytes
      }
      Err(e) => {
        println!("{e:?}");
        continue;
      }
    };
    for (n, raw_chunk) in RawChunkIter::new(&bytes).enumerate() {
      let crc = if raw_chunk.verify_crc().is_ok() { "ok" } else { "BAD" };
      println!("{n}: {:?} ({} bytes, crc {crc})", raw_chunk.ty(), raw_chunk.data().len());
    }
    let decoded = match decode(&bytes) {
      Ok(decoded) => decoded,
      Err(e) => {
        println!("decode failed: {e}");
        continue;
      }
    };
    println!("{:?}", decoded.header);
    if let Some(palette) = &decoded.palette {
      println!("{palette:?}");
    }
    for entry in &decoded.metadata.text {
      println!("{}: {}", entry.keyword, entry.text);
    }
    println!("decoded {} bytes of pixel data", decoded.image.data().len());

    if let Some(out) = &reencode_to {
      // with several inputs, number the outputs
      let out_path =
        if files.len() == 1 { out.clone() } else { format!("{i}-{out}") };
      let options = EncodeOptions::default().with_interlace(decoded.header.is_interlaced());
      let result = decoded
        .encode(options)
        .map_err(|e| e.to_string())
        .and_then(|png| std::fs::write(&out_path, png).map_err(|e| e.to_string()));
      match result {
        Ok(()) => println!("wrote `{out_path}`"),
        Err(e) => println!("re-encode failed: {e}"),
      }
    }
  }
}
