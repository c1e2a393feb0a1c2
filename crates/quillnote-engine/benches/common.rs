// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_note_markup(sections: usize) -> String {
    let base = "<h1>Title</h1>\n<p>Paragraph with <b>some</b> <i>styled</i> content.</p>\n<ul>\n<li>Bullet point</li>\n<li>Another <u>item</u></li>\n</ul>\n<blockquote>Quoted text</blockquote>\n";
    base.repeat(sections)
}
