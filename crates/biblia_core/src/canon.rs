//! crates/biblia_core/src/canon.rs
//!
//! Static data for the 66-book Protestant canon: book identities (Portuguese
//! abbreviation, display name, chapter count) and the ordered chronological
//! block table the reading plan is generated from. Both are plain constants
//! injected into the generator, never hidden module state.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// One canonical book, in canonical order (`Genesis` is book 1,
/// `Apocalipse` is book 66).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Book {
    Genesis,
    Exodo,
    Levitico,
    Numeros,
    Deuteronomio,
    Josue,
    Juizes,
    Rute,
    Samuel1,
    Samuel2,
    Reis1,
    Reis2,
    Cronicas1,
    Cronicas2,
    Esdras,
    Neemias,
    Ester,
    Jo,
    Salmos,
    Proverbios,
    Eclesiastes,
    Canticos,
    Isaias,
    Jeremias,
    Lamentacoes,
    Ezequiel,
    Daniel,
    Oseias,
    Joel,
    Amos,
    Obadias,
    Jonas,
    Miqueias,
    Naum,
    Habacuque,
    Sofonias,
    Ageu,
    Zacarias,
    Malaquias,
    Mateus,
    Marcos,
    Lucas,
    Joao,
    Atos,
    Romanos,
    Corintios1,
    Corintios2,
    Galatas,
    Efesios,
    Filipenses,
    Colossenses,
    Tessalonicenses1,
    Tessalonicenses2,
    Timoteo1,
    Timoteo2,
    Tito,
    Filemom,
    Hebreus,
    Tiago,
    Pedro1,
    Pedro2,
    Joao1,
    Joao2,
    Joao3,
    Judas,
    Apocalipse,
}

struct BookInfo {
    book: Book,
    abbrev: &'static str,
    name: &'static str,
    chapters: u32,
}

const fn info(book: Book, abbrev: &'static str, name: &'static str, chapters: u32) -> BookInfo {
    BookInfo {
        book,
        abbrev,
        name,
        chapters,
    }
}

/// Canonical book table, indexed by `Book as usize`.
const BOOKS: [BookInfo; 66] = [
    info(Book::Genesis, "GN", "Gênesis", 50),
    info(Book::Exodo, "EX", "Êxodo", 40),
    info(Book::Levitico, "LV", "Levítico", 27),
    info(Book::Numeros, "NM", "Números", 36),
    info(Book::Deuteronomio, "DT", "Deuteronômio", 34),
    info(Book::Josue, "JS", "Josué", 24),
    info(Book::Juizes, "JZ", "Juízes", 21),
    info(Book::Rute, "RT", "Rute", 4),
    info(Book::Samuel1, "1SM", "1 Samuel", 31),
    info(Book::Samuel2, "2SM", "2 Samuel", 24),
    info(Book::Reis1, "1RS", "1 Reis", 22),
    info(Book::Reis2, "2RS", "2 Reis", 25),
    info(Book::Cronicas1, "1CR", "1 Crônicas", 29),
    info(Book::Cronicas2, "2CR", "2 Crônicas", 36),
    info(Book::Esdras, "ED", "Esdras", 10),
    info(Book::Neemias, "NE", "Neemias", 13),
    info(Book::Ester, "ET", "Ester", 10),
    info(Book::Jo, "JO", "Jó", 42),
    info(Book::Salmos, "SL", "Salmos", 150),
    info(Book::Proverbios, "PV", "Provérbios", 31),
    info(Book::Eclesiastes, "EC", "Eclesiastes", 12),
    info(Book::Canticos, "CT", "Cânticos", 8),
    info(Book::Isaias, "IS", "Isaías", 66),
    info(Book::Jeremias, "JR", "Jeremias", 52),
    info(Book::Lamentacoes, "LM", "Lamentações", 5),
    info(Book::Ezequiel, "EZ", "Ezequiel", 48),
    info(Book::Daniel, "DN", "Daniel", 12),
    info(Book::Oseias, "OS", "Oseias", 14),
    info(Book::Joel, "JL", "Joel", 3),
    info(Book::Amos, "AM", "Amós", 9),
    info(Book::Obadias, "OB", "Obadias", 1),
    info(Book::Jonas, "JN", "Jonas", 4),
    info(Book::Miqueias, "MQ", "Miqueias", 7),
    info(Book::Naum, "NA", "Naum", 3),
    info(Book::Habacuque, "HC", "Habacuque", 3),
    info(Book::Sofonias, "SF", "Sofonias", 3),
    info(Book::Ageu, "AG", "Ageu", 2),
    info(Book::Zacarias, "ZC", "Zacarias", 14),
    info(Book::Malaquias, "ML", "Malaquias", 4),
    info(Book::Mateus, "MT", "Mateus", 28),
    info(Book::Marcos, "MC", "Marcos", 16),
    info(Book::Lucas, "LC", "Lucas", 24),
    info(Book::Joao, "JOAO", "João", 21),
    info(Book::Atos, "AT", "Atos", 28),
    info(Book::Romanos, "RM", "Romanos", 16),
    info(Book::Corintios1, "1CO", "1 Coríntios", 16),
    info(Book::Corintios2, "2CO", "2 Coríntios", 13),
    info(Book::Galatas, "GL", "Gálatas", 6),
    info(Book::Efesios, "EF", "Efésios", 6),
    info(Book::Filipenses, "FP", "Filipenses", 4),
    info(Book::Colossenses, "CL", "Colossenses", 4),
    info(Book::Tessalonicenses1, "1TS", "1 Tessalonicenses", 5),
    info(Book::Tessalonicenses2, "2TS", "2 Tessalonicenses", 3),
    info(Book::Timoteo1, "1TM", "1 Timóteo", 6),
    info(Book::Timoteo2, "2TM", "2 Timóteo", 4),
    info(Book::Tito, "TT", "Tito", 3),
    info(Book::Filemom, "FM", "Filemom", 1),
    info(Book::Hebreus, "HB", "Hebreus", 13),
    info(Book::Tiago, "TG", "Tiago", 5),
    info(Book::Pedro1, "1PE", "1 Pedro", 5),
    info(Book::Pedro2, "2PE", "2 Pedro", 3),
    info(Book::Joao1, "1JO", "1 João", 5),
    info(Book::Joao2, "2JO", "2 João", 1),
    info(Book::Joao3, "3JO", "3 João", 1),
    info(Book::Judas, "JD", "Judas", 1),
    info(Book::Apocalipse, "AP", "Apocalipse", 22),
];

/// Chapters in the whole canon. The block table must cover exactly this many.
pub const CANON_CHAPTER_COUNT: u32 = 1_189;

impl Book {
    /// Every book in canonical order.
    pub const ALL: [Book; 66] = {
        let mut all = [Book::Genesis; 66];
        let mut i = 0;
        while i < 66 {
            all[i] = BOOKS[i].book;
            i += 1;
        }
        all
    };

    fn entry(self) -> &'static BookInfo {
        &BOOKS[self as usize]
    }

    /// Short abbreviation used in navigation targets and serialized data,
    /// e.g. `"GN"` or `"1SM"`.
    pub fn abbreviation(self) -> &'static str {
        self.entry().abbrev
    }

    /// Human-readable display name, e.g. `"Gênesis"`.
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn chapter_count(self) -> u32 {
        self.entry().chapters
    }

    /// Canonical 1-based book number (`Genesis` is 1, `Apocalipse` is 66),
    /// matching the `book` column of the verses table.
    pub fn number(self) -> u16 {
        self as u16 + 1
    }

    pub fn from_number(number: u16) -> Option<Book> {
        if number == 0 {
            return None;
        }
        Book::ALL.get(number as usize - 1).copied()
    }

    pub fn from_abbreviation(abbrev: &str) -> Option<Book> {
        BOOKS.iter().find(|b| b.abbrev == abbrev).map(|b| b.book)
    }
}

impl Serialize for Book {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.abbreviation())
    }
}

impl<'de> Deserialize<'de> for Book {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AbbrevVisitor;

        impl Visitor<'_> for AbbrevVisitor {
            type Value = Book;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a canonical book abbreviation such as \"GN\"")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Book, E> {
                Book::from_abbreviation(value)
                    .ok_or_else(|| E::custom(format!("unknown book abbreviation '{value}'")))
            }
        }

        deserializer.deserialize_str(AbbrevVisitor)
    }
}

/// One contiguous run of chapters within a single book, tagged with the
/// historical era it belongs to in the chronological reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingBlock {
    pub book: Book,
    pub start_chapter: u32,
    pub end_chapter: u32,
    pub era: &'static str,
}

const fn block(book: Book, start_chapter: u32, end_chapter: u32, era: &'static str) -> ReadingBlock {
    ReadingBlock {
        book,
        start_chapter,
        end_chapter,
        era,
    }
}

/// The chronological reading order: every chapter of the canon exactly once,
/// ordered by the era the events (roughly) belong to rather than by canonical
/// book order. Jó sits with the patriarchs, the psalms are split around
/// David's reign, and the epistles are interleaved with Acts.
pub const CHRONOLOGICAL_BLOCKS: &[ReadingBlock] = &[
    block(Book::Genesis, 1, 11, "1. Criação e Queda"),
    block(Book::Jo, 1, 42, "2. Era Patriarcal (Jó)"),
    block(Book::Genesis, 12, 50, "3. Os Patriarcas"),
    block(Book::Exodo, 1, 40, "4. O Êxodo"),
    block(Book::Levitico, 1, 27, "5. A Lei e o Tabernáculo"),
    block(Book::Numeros, 1, 36, "6. A Peregrinação"),
    block(Book::Salmos, 90, 90, "6. A Peregrinação"),
    block(Book::Deuteronomio, 1, 34, "7. Últimas Palavras de Moisés"),
    block(Book::Josue, 1, 24, "8. A Conquista"),
    block(Book::Juizes, 1, 21, "9. Os Juízes"),
    block(Book::Rute, 1, 4, "9. Os Juízes"),
    block(Book::Samuel1, 1, 31, "10. Samuel, Saul e Davi"),
    block(Book::Samuel2, 1, 24, "11. O Reinado de Davi"),
    block(Book::Cronicas1, 1, 29, "11. O Reinado de Davi"),
    block(Book::Salmos, 1, 89, "12. Salmos (Davi)"),
    block(Book::Salmos, 91, 150, "12. Salmos (Outros)"),
    block(Book::Reis1, 1, 11, "13. Salomão"),
    block(Book::Cronicas2, 1, 9, "13. Salomão"),
    block(Book::Proverbios, 1, 31, "14. Sabedoria de Salomão"),
    block(Book::Eclesiastes, 1, 12, "14. Sabedoria de Salomão"),
    block(Book::Canticos, 1, 8, "14. Sabedoria de Salomão"),
    block(Book::Reis1, 12, 22, "15. Reino Dividido"),
    block(Book::Reis2, 1, 25, "15. Reino Dividido"),
    block(Book::Cronicas2, 10, 36, "15. Reino Dividido"),
    block(Book::Obadias, 1, 1, "16. Profetas Menores"),
    block(Book::Joel, 1, 3, "16. Profetas Menores"),
    block(Book::Jonas, 1, 4, "16. Profetas Menores"),
    block(Book::Amos, 1, 9, "16. Profetas Menores"),
    block(Book::Oseias, 1, 14, "16. Profetas Menores"),
    block(Book::Isaias, 1, 66, "17. Profetas Maiores (Isaías)"),
    block(Book::Miqueias, 1, 7, "16. Profetas Menores"),
    block(Book::Naum, 1, 3, "16. Profetas Menores"),
    block(Book::Sofonias, 1, 3, "16. Profetas Menores"),
    block(Book::Jeremias, 1, 52, "18. O Profeta da Queda"),
    block(Book::Lamentacoes, 1, 5, "18. O Profeta da Queda"),
    block(Book::Habacuque, 1, 3, "16. Profetas Menores"),
    block(Book::Daniel, 1, 12, "19. O Exílio Babilônico"),
    block(Book::Ezequiel, 1, 48, "19. O Exílio Babilônico"),
    block(Book::Esdras, 1, 10, "20. O Retorno"),
    block(Book::Ageu, 1, 2, "20. O Retorno"),
    block(Book::Zacarias, 1, 14, "20. O Retorno"),
    block(Book::Ester, 1, 10, "20. O Retorno"),
    block(Book::Neemias, 1, 13, "20. O Retorno"),
    block(Book::Malaquias, 1, 4, "20. O Retorno"),
    block(Book::Lucas, 1, 24, "21. A Vida de Jesus"),
    block(Book::Joao, 1, 21, "21. A Vida de Jesus"),
    block(Book::Mateus, 1, 28, "21. A Vida de Jesus"),
    block(Book::Marcos, 1, 16, "21. A Vida de Jesus"),
    block(Book::Atos, 1, 12, "22. Igreja Primitiva"),
    block(Book::Tiago, 1, 5, "23. Cartas Gerais"),
    block(Book::Atos, 13, 28, "24. Viagens de Paulo"),
    block(Book::Galatas, 1, 6, "25. Cartas de Paulo"),
    block(Book::Tessalonicenses1, 1, 5, "25. Cartas de Paulo"),
    block(Book::Tessalonicenses2, 1, 3, "25. Cartas de Paulo"),
    block(Book::Corintios1, 1, 16, "25. Cartas de Paulo"),
    block(Book::Corintios2, 1, 13, "25. Cartas de Paulo"),
    block(Book::Romanos, 1, 16, "25. Cartas de Paulo"),
    block(Book::Efesios, 1, 6, "25. Cartas de Paulo"),
    block(Book::Filipenses, 1, 4, "25. Cartas de Paulo"),
    block(Book::Colossenses, 1, 4, "25. Cartas de Paulo"),
    block(Book::Filemom, 1, 1, "25. Cartas de Paulo"),
    block(Book::Hebreus, 1, 13, "23. Cartas Gerais"),
    block(Book::Timoteo1, 1, 6, "25. Cartas de Paulo"),
    block(Book::Tito, 1, 3, "25. Cartas de Paulo"),
    block(Book::Pedro1, 1, 5, "23. Cartas Gerais"),
    block(Book::Pedro2, 1, 3, "23. Cartas Gerais"),
    block(Book::Timoteo2, 1, 4, "25. Cartas de Paulo"),
    block(Book::Joao1, 1, 5, "23. Cartas Gerais"),
    block(Book::Joao2, 1, 1, "23. Cartas Gerais"),
    block(Book::Joao3, 1, 1, "23. Cartas Gerais"),
    block(Book::Judas, 1, 1, "23. Cartas Gerais"),
    block(Book::Apocalipse, 1, 22, "26. Fim e Eternidade"),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn canon_totals_add_up() {
        let total: u32 = Book::ALL.iter().map(|b| b.chapter_count()).sum();
        assert_eq!(total, CANON_CHAPTER_COUNT);
        assert_eq!(Book::ALL.len(), 66);
    }

    #[test]
    fn book_numbers_and_abbreviations_round_trip() {
        for (idx, book) in Book::ALL.iter().enumerate() {
            assert_eq!(book.number() as usize, idx + 1);
            assert_eq!(Book::from_number(book.number()), Some(*book));
            assert_eq!(Book::from_abbreviation(book.abbreviation()), Some(*book));
        }
        assert_eq!(Book::from_number(0), None);
        assert_eq!(Book::from_number(67), None);
        assert_eq!(Book::from_abbreviation("XX"), None);
    }

    #[test]
    fn book_serializes_as_abbreviation() {
        let json = serde_json::to_string(&Book::Joao).unwrap();
        assert_eq!(json, "\"JOAO\"");
        let back: Book = serde_json::from_str("\"1SM\"").unwrap();
        assert_eq!(back, Book::Samuel1);
        assert!(serde_json::from_str::<Book>("\"nope\"").is_err());
    }

    // The block table is the single source of truth for the chronological
    // order; a malformed table must fail here, not at runtime.
    #[test]
    fn chronological_blocks_cover_every_chapter_exactly_once() {
        let mut seen: HashSet<(Book, u32)> = HashSet::new();
        for block in CHRONOLOGICAL_BLOCKS {
            assert!(
                block.start_chapter >= 1 && block.end_chapter <= block.book.chapter_count(),
                "block {:?} out of range for {}",
                block,
                block.book.name()
            );
            assert!(block.start_chapter <= block.end_chapter, "empty block {block:?}");
            for chapter in block.start_chapter..=block.end_chapter {
                assert!(
                    seen.insert((block.book, chapter)),
                    "duplicate chapter {} {}",
                    block.book.abbreviation(),
                    chapter
                );
            }
        }
        assert_eq!(seen.len() as u32, CANON_CHAPTER_COUNT);
        for book in Book::ALL {
            for chapter in 1..=book.chapter_count() {
                assert!(
                    seen.contains(&(book, chapter)),
                    "missing chapter {} {}",
                    book.abbreviation(),
                    chapter
                );
            }
        }
    }
}
