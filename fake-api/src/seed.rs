//! Fixture records served on startup.

use crate::{Cart, CartLine, Post, Product, User};

fn product(id: u64, title: &str, description: &str, price: f64, category: &str) -> Product {
    Product {
        id,
        title: title.to_string(),
        description: description.to_string(),
        price,
        category: category.to_string(),
    }
}

pub(crate) fn products() -> Vec<Product> {
    vec![
        product(
            1,
            "Essence Mascara Lash Princess",
            "A popular mascara known for its volumizing and lengthening effects.",
            9.99,
            "beauty",
        ),
        product(
            2,
            "Eyeshadow Palette with Mirror",
            "A versatile palette with a range of shades and a built-in mirror.",
            19.99,
            "beauty",
        ),
        product(
            3,
            "Wireless Earbuds",
            "Compact earbuds with noise isolation and a charging case.",
            59.99,
            "electronics",
        ),
        product(
            4,
            "Mechanical Keyboard",
            "Tenkeyless keyboard with hot-swappable switches.",
            89.5,
            "electronics",
        ),
        product(
            5,
            "Table Lamp",
            "Warm-light desk lamp with a linen shade.",
            24.0,
            "home-decoration",
        ),
    ]
}

fn user(id: u64, first_name: &str, last_name: &str) -> User {
    User {
        id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!(
            "{}.{}@x.dummyjson.com",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
    }
}

pub(crate) fn users() -> Vec<User> {
    vec![
        user(1, "Emily", "Johnson"),
        user(2, "Michael", "Williams"),
        user(3, "Sophia", "Brown"),
    ]
}

fn line(id: u64, title: &str, price: f64, quantity: u32) -> CartLine {
    CartLine {
        id,
        title: title.to_string(),
        price,
        quantity,
    }
}

fn cart(id: u64, user_id: u64, products: Vec<CartLine>) -> Cart {
    let total = products
        .iter()
        .map(|l| l.price * f64::from(l.quantity))
        .sum();
    Cart {
        id,
        user_id,
        products,
        total,
    }
}

pub(crate) fn carts() -> Vec<Cart> {
    vec![
        cart(
            1,
            1,
            vec![
                line(1, "Essence Mascara Lash Princess", 9.99, 2),
                line(3, "Wireless Earbuds", 59.99, 1),
            ],
        ),
        cart(2, 2, vec![line(4, "Mechanical Keyboard", 89.5, 1)]),
        cart(3, 1, vec![line(5, "Table Lamp", 24.0, 3)]),
    ]
}

fn post(id: u64, title: &str, body: &str, user_id: u64, tags: &[&str]) -> Post {
    Post {
        id,
        title: title.to_string(),
        body: body.to_string(),
        user_id,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

pub(crate) fn posts() -> Vec<Post> {
    vec![
        post(
            1,
            "His mother had always taught him",
            "His mother had always taught him not to ever think of himself as better than others.",
            1,
            &["history", "american", "crime"],
        ),
        post(
            2,
            "He was an expert but not in a discipline",
            "He was an expert but not in a discipline that anyone could fully appreciate.",
            2,
            &["french", "fiction", "english"],
        ),
        post(
            3,
            "Dave watched as the forest burned up on the hill",
            "Dave watched as the forest burned up on the hill, only a few miles from his house.",
            3,
            &["magical", "history", "french"],
        ),
    ]
}
