// src/simulation/csv.rs

use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use crate::simulation::Sample;

/// CSV出力の設定とヘッダーの書き込み
///
/// 出力先のディレクトリが無ければ作成する。
pub fn setup_csv_output<P: AsRef<Path>>(
    path: P,
    links: usize,
) -> Result<Box<dyn Write>, Box<dyn Error>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output_file = File::create(path)?;
    let mut writer = BufWriter::new(output_file);
    write_csv_header(&mut writer, links)?;
    Ok(Box::new(writer))
}

/// CSVヘッダーの書き込み
///
/// 各列群は支点を含む n+1 点分。
pub fn write_csv_header<W: Write>(writer: &mut W, links: usize) -> Result<(), std::io::Error> {
    let mut header = String::from("time,iteration,energy");
    for name in ["x", "z", "dx", "dz"] {
        for i in 0..=links {
            header.push_str(&format!(",{name}{i}"));
        }
    }
    header.push('\n');
    writer.write_all(header.as_bytes())?;
    Ok(())
}

/// CSV行の作成
pub fn create_csv_row(sample: &Sample) -> String {
    let mut row = format!("{},{},{}", sample.time, sample.iteration, sample.energy);
    for column in [&sample.x, &sample.z, &sample.dx, &sample.dz] {
        for value in column.iter() {
            row.push_str(&format!(",{value}"));
        }
    }
    row.push('\n');
    row
}
