//! Built-in catalog shown before any external search

use std::collections::BTreeSet;

use crate::types::Book;

struct SeedBook {
    id: &'static str,
    title: &'static str,
    author: &'static str,
    pages: u32,
    rating: f64,
    description: &'static str,
    tags: &'static [&'static str],
    publisher: &'static str,
    published_date: &'static str,
}

const SEED_BOOKS: &[SeedBook] = &[
    SeedBook {
        id: "dom-casmurro",
        title: "Dom Casmurro",
        author: "Machado de Assis",
        pages: 256,
        rating: 4.6,
        description: "Bentinho revisita a juventude e o ciúme que marcou seu casamento com Capitu.",
        tags: &["clássico", "romance", "literatura brasileira"],
        publisher: "Penguin-Companhia",
        published_date: "1899",
    },
    SeedBook {
        id: "a-hora-da-estrela",
        title: "A Hora da Estrela",
        author: "Clarice Lispector",
        pages: 88,
        rating: 4.5,
        description: "A história de Macabéa, narrada por Rodrigo S.M., no Rio de Janeiro.",
        tags: &["clássico", "literatura brasileira"],
        publisher: "Rocco",
        published_date: "1977",
    },
    SeedBook {
        id: "grande-sertao-veredas",
        title: "Grande Sertão: Veredas",
        author: "João Guimarães Rosa",
        pages: 560,
        rating: 4.7,
        description: "Riobaldo relembra sua vida de jagunço e o amor por Diadorim.",
        tags: &["clássico", "romance", "sertão"],
        publisher: "Companhia das Letras",
        published_date: "1956",
    },
    SeedBook {
        id: "1984",
        title: "1984",
        author: "George Orwell",
        pages: 416,
        rating: 4.7,
        description: "Winston Smith tenta preservar a própria mente sob a vigilância do Grande Irmão.",
        tags: &["distopia", "ficção científica", "clássico"],
        publisher: "Companhia das Letras",
        published_date: "1949",
    },
    SeedBook {
        id: "cem-anos-de-solidao",
        title: "Cem Anos de Solidão",
        author: "Gabriel García Márquez",
        pages: 448,
        rating: 4.6,
        description: "Sete gerações da família Buendía na cidade imaginária de Macondo.",
        tags: &["realismo mágico", "romance", "clássico"],
        publisher: "Record",
        published_date: "1967",
    },
    SeedBook {
        id: "o-pequeno-principe",
        title: "O Pequeno Príncipe",
        author: "Antoine de Saint-Exupéry",
        pages: 96,
        rating: 4.8,
        description: "Um piloto perdido no deserto conhece um pequeno príncipe vindo de outro planeta.",
        tags: &["fábula", "infantojuvenil", "clássico"],
        publisher: "Agir",
        published_date: "1943",
    },
];

/// The seed catalog as fresh `want` books
pub fn seed_books() -> Vec<Book> {
    SEED_BOOKS.iter().map(to_book).collect()
}

/// Find a seed book by id
pub fn find_seed_book(id: &str) -> Option<Book> {
    SEED_BOOKS.iter().find(|s| s.id == id).map(to_book)
}

fn to_book(seed: &SeedBook) -> Book {
    let mut book = Book::new(
        seed.id.to_string(),
        seed.title.to_string(),
        seed.author.to_string(),
        seed.pages,
    );
    book.rating = seed.rating;
    book.description = seed.description.to_string();
    book.tags = seed.tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>();
    book.publisher = Some(seed.publisher.to_string());
    book.published_date = Some(seed.published_date.to_string());
    book
}
