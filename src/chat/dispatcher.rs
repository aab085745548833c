use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::error;
use uuid::Uuid;

use crate::chat::classifier::IntentClassifier;
use crate::chat::intent::{ChatEntities, Intent};
use crate::models::{Cart, Category, ChatHistory, Order, OrderItem, OrderStatus, PaymentMethod, ShippingAddress};
use crate::store::{ProductFilter, Store};
use crate::types::ProductSummary;

/// How many previous exchanges feed the classifier as context.
const CONTEXT_TURNS: usize = 5;

/// Result of one dialogue turn.
#[derive(Debug)]
pub struct ChatReply {
    pub response: String,
    pub intent: Intent,
    pub entities: ChatEntities,
    pub products: Option<Vec<ProductSummary>>,
    pub cart_updated: bool,
}

impl ChatReply {
    fn text(intent: Intent, entities: &ChatEntities, response: impl Into<String>) -> Self {
        ChatReply {
            response: response.into(),
            intent,
            entities: entities.clone(),
            products: None,
            cart_updated: false,
        }
    }
}

/// Turns a classified message into storefront actions and a reply. All
/// conversational state lives in the persisted chat history; the dispatcher
/// itself is stateless and cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn Store>,
    classifier: Arc<dyn IntentClassifier>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn Store>, classifier: Arc<dyn IntentClassifier>) -> Self {
        Dispatcher { store, classifier }
    }

    pub fn generate_session_id() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(13)
            .map(|c| (c as char).to_ascii_lowercase())
            .collect();
        format!("session_{}_{}", Utc::now().timestamp_millis(), suffix)
    }

    /// Runs one full turn: classify, act, persist the exchange. Returns the
    /// reply plus the session id (generated when the caller had none).
    pub async fn handle_turn(
        &self,
        user_id: Uuid,
        message: &str,
        session_id: Option<String>,
    ) -> Result<(ChatReply, String)> {
        let session_id = session_id.unwrap_or_else(Self::generate_session_id);

        let mut history = self
            .store
            .find_history(user_id, &session_id)
            .await?
            .unwrap_or_else(|| ChatHistory::new(user_id, &session_id));

        let context = history.recent_context(CONTEXT_TURNS);
        let result = self.classifier.classify(message, &context).await;

        let reply = self
            .dispatch(result.intent, &result.entities, user_id, message)
            .await;

        history.add_message(message, &reply.response, reply.intent, result.entities.sanitized());
        self.store.save_history(&history).await?;

        Ok((reply, session_id))
    }

    async fn dispatch(
        &self,
        intent: Intent,
        entities: &ChatEntities,
        user_id: Uuid,
        message: &str,
    ) -> ChatReply {
        match intent {
            Intent::BrowseProducts => {
                self.browse_products(entities).await.unwrap_or_else(|e| {
                    error!("Browse products error: {:?}", e);
                    ChatReply::text(
                        intent,
                        entities,
                        "I'm having trouble searching for products right now. Please try again.",
                    )
                })
            }
            Intent::AddToCart => self.add_to_cart(entities, user_id).await.unwrap_or_else(|e| {
                error!("Add to cart error: {:?}", e);
                ChatReply::text(
                    intent,
                    entities,
                    "I'm having trouble adding items to your cart right now. Please try again.",
                )
            }),
            Intent::RemoveFromCart => {
                self.remove_from_cart(entities, user_id).await.unwrap_or_else(|e| {
                    error!("Remove from cart error: {:?}", e);
                    ChatReply::text(
                        intent,
                        entities,
                        "I'm having trouble removing items from your cart right now. Please try again.",
                    )
                })
            }
            Intent::ViewCart => self.view_cart(entities, user_id).await.unwrap_or_else(|e| {
                error!("View cart error: {:?}", e);
                ChatReply::text(
                    intent,
                    entities,
                    "I'm having trouble accessing your cart right now. Please try again.",
                )
            }),
            Intent::Checkout => self.checkout(entities, user_id).await.unwrap_or_else(|e| {
                error!("Checkout error: {:?}", e);
                ChatReply::text(
                    intent,
                    entities,
                    "I'm having trouble processing your checkout right now. Please try again.",
                )
            }),
            Intent::Greeting => ChatReply::text(
                intent,
                entities,
                "Hello! 👋 Welcome to ShoeBot! I can help you find the perfect shoes, \
                 manage your cart, and checkout. What are you looking for today?",
            ),
            Intent::GeneralInquiry => {
                let answer = self.classifier.answer(message).await.unwrap_or_else(|| {
                    "I'm here to help! You can ask me about our shoes, shipping, returns, \
                     or anything else. What would you like to know?"
                        .to_string()
                });
                ChatReply::text(intent, entities, answer)
            }
            Intent::Unknown => ChatReply::text(
                intent,
                entities,
                "I'm not sure I understand. I can help you browse shoes, add items to \
                 your cart, remove items, view your cart, or checkout. What would you \
                 like to do?",
            ),
        }
    }

    async fn browse_products(&self, entities: &ChatEntities) -> Result<ChatReply> {
        let filter = ProductFilter {
            category: entities
                .category
                .as_deref()
                .map(Category::normalize_term),
            name_or_brand: entities.product_name.clone(),
            color: entities.color.clone(),
        };

        let products = self.store.search_products(&filter, 3).await?;

        if products.is_empty() {
            return Ok(ChatReply::text(
                Intent::BrowseProducts,
                entities,
                "I couldn't find any shoes matching your criteria. Would you like me to \
                 show you our popular products instead?",
            ));
        }

        let listing = products
            .iter()
            .map(|p| {
                format!(
                    "• **{}** by {} - ${:.2}\n  Available in: {}\n  Sizes: {}",
                    p.name,
                    p.brand,
                    p.price,
                    p.colors.join(", "),
                    p.sizes.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let response = format!(
            "Here are {} shoes I found for you:\n\n{}\n\nWould you like to know more \
             about any of these, or add one to your cart?",
            products.len(),
            listing
        );

        Ok(ChatReply {
            response,
            intent: Intent::BrowseProducts,
            entities: entities.clone(),
            products: Some(products.iter().map(ProductSummary::from).collect()),
            cart_updated: false,
        })
    }

    async fn add_to_cart(&self, entities: &ChatEntities, user_id: Uuid) -> Result<ChatReply> {
        let clarify = |entities: &ChatEntities| {
            ChatReply::text(
                Intent::AddToCart,
                entities,
                "I couldn't find that specific shoe. Could you please be more specific \
                 about which shoe you'd like to add to your cart?",
            )
        };

        let term = match entities.product_name.as_deref() {
            Some(term) if !term.trim().is_empty() => term,
            _ => return Ok(clarify(entities)),
        };

        // Resolution order: exact-ish name, then brand, then description.
        let product = match self.store.find_product_by_name(term).await? {
            Some(product) => Some(product),
            None => match self.store.find_product_by_brand(term).await? {
                Some(product) => Some(product),
                None => self.store.find_product_by_description(term).await?,
            },
        };

        let product = match product {
            Some(product) => product,
            None => return Ok(clarify(entities)),
        };

        let size = match entities.size.as_deref().filter(|s| product.has_size(s)) {
            Some(size) => size,
            None => {
                return Ok(ChatReply::text(
                    Intent::AddToCart,
                    entities,
                    format!(
                        "Please specify a valid size for {}. Available sizes: {}",
                        product.name,
                        product.sizes.join(", ")
                    ),
                ))
            }
        };

        let color = match entities
            .color
            .as_deref()
            .and_then(|c| product.matching_color(c))
        {
            Some(color) => color.to_string(),
            None => {
                return Ok(ChatReply::text(
                    Intent::AddToCart,
                    entities,
                    format!(
                        "Please specify a valid color for {}. Available colors: {}",
                        product.name,
                        product.colors.join(", ")
                    ),
                ))
            }
        };

        let quantity = entities.quantity.filter(|q| *q > 0).unwrap_or(1);

        let mut cart = self
            .store
            .find_cart(user_id)
            .await?
            .unwrap_or_else(|| Cart::new(user_id));
        cart.merge_chat_item(product.id, quantity, size, &color, product.price);
        self.store.save_cart(&cart).await?;

        let response = format!(
            "Great! I've added {} {} in {} (size {}) to your cart for ${:.2}. Your cart \
             total is now ${:.2}. Would you like to continue shopping or checkout?",
            quantity,
            product.name,
            color.to_lowercase(),
            size,
            product.price * quantity as f64,
            cart.total_amount
        );

        Ok(ChatReply {
            response,
            intent: Intent::AddToCart,
            entities: entities.clone(),
            products: None,
            cart_updated: true,
        })
    }

    async fn remove_from_cart(&self, entities: &ChatEntities, user_id: Uuid) -> Result<ChatReply> {
        let cart = self.store.find_cart(user_id).await?;
        let mut cart = match cart {
            Some(cart) if !cart.is_empty() => cart,
            _ => {
                return Ok(ChatReply::text(
                    Intent::RemoveFromCart,
                    entities,
                    "Your cart is already empty. Would you like to browse our shoes?",
                ))
            }
        };

        let mut labels = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            labels.push(self.product_label(item.product_id).await?);
        }

        let index = self.resolve_cart_line(&cart, &labels, entities);

        let index = match index {
            Some(index) => index,
            None => {
                let listing = cart
                    .items
                    .iter()
                    .zip(&labels)
                    .map(|(item, (name, _))| {
                        format!(
                            "• {} ({}, size {}) - Qty: {}",
                            name, item.color, item.size, item.quantity
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                return Ok(ChatReply::text(
                    Intent::RemoveFromCart,
                    entities,
                    format!(
                        "I couldn't find that item in your cart. Here's what you \
                         currently have:\n\n{listing}\n\nWhich item would you like to remove?"
                    ),
                ));
            }
        };

        let name = labels[index].0.clone();
        let removed = cart.remove_line(index);
        self.store.save_cart(&cart).await?;

        let response = format!(
            "I've removed {} in {} (size {}) from your cart. Your new cart total is ${:.2}.",
            name, removed.color, removed.size, cart.total_amount
        );

        Ok(ChatReply {
            response,
            intent: Intent::RemoveFromCart,
            entities: entities.clone(),
            products: None,
            cart_updated: true,
        })
    }

    /// Picks the first cart line matching the described item. A product name
    /// narrows by name or brand substring; size and color, when present, must
    /// also agree (color as a case-insensitive substring, matching the add
    /// path). With no usable entities nothing matches and the caller lists
    /// the cart.
    fn resolve_cart_line(
        &self,
        cart: &Cart,
        labels: &[(String, String)],
        entities: &ChatEntities,
    ) -> Option<usize> {
        let term = entities
            .product_name
            .as_deref()
            .map(str::to_lowercase)
            .filter(|t| !t.trim().is_empty());
        let size = entities.size.as_deref().filter(|s| !s.trim().is_empty());
        let color = entities
            .color
            .as_deref()
            .map(str::to_lowercase)
            .filter(|c| !c.trim().is_empty());

        if term.is_none() && size.is_none() && color.is_none() {
            return None;
        }

        cart.items.iter().enumerate().position(|(i, item)| {
            let (name, brand) = &labels[i];
            let name_ok = term.as_deref().map_or(true, |t| {
                name.to_lowercase().contains(t) || brand.to_lowercase().contains(t)
            });
            let size_ok = size.map_or(true, |s| item.size == s);
            let color_ok = color
                .as_deref()
                .map_or(true, |c| item.color.to_lowercase().contains(c));
            name_ok && size_ok && color_ok
        })
    }

    async fn view_cart(&self, entities: &ChatEntities, user_id: Uuid) -> Result<ChatReply> {
        let cart = self.store.find_cart(user_id).await?;
        let cart = match cart {
            Some(cart) if !cart.is_empty() => cart,
            _ => {
                return Ok(ChatReply::text(
                    Intent::ViewCart,
                    entities,
                    "Your cart is empty. Would you like me to show you some popular shoes?",
                ))
            }
        };

        let mut lines = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let (name, brand) = self.product_label(item.product_id).await?;
            lines.push(format!(
                "• **{}** by {} ({}, size {}) - Qty: {} - ${:.2}",
                name,
                brand,
                item.color,
                item.size,
                item.quantity,
                item.line_total()
            ));
        }

        let response = format!(
            "Here's what's in your cart:\n\n{}\n\n**Total: ${:.2}**\n\nReady to \
             checkout, or would you like to keep shopping?",
            lines.join("\n"),
            cart.total_amount
        );

        Ok(ChatReply::text(Intent::ViewCart, entities, response))
    }

    async fn checkout(&self, entities: &ChatEntities, user_id: Uuid) -> Result<ChatReply> {
        let cart = self.store.find_cart(user_id).await?;
        let mut cart = match cart {
            Some(cart) if !cart.is_empty() => cart,
            _ => {
                return Ok(ChatReply::text(
                    Intent::Checkout,
                    entities,
                    "Your cart is empty. Please add some shoes before checking out!",
                ))
            }
        };

        let user = match self.store.find_user(user_id).await? {
            Some(user) => user,
            None => {
                return Ok(ChatReply::text(
                    Intent::Checkout,
                    entities,
                    "Sorry, I couldn't find your user account. Please try logging in again.",
                ))
            }
        };

        let address = match user.complete_address() {
            Some(address) => address,
            None => {
                return Ok(ChatReply::text(
                    Intent::Checkout,
                    entities,
                    "To complete your order, please update your profile with a complete \
                     shipping address first. Then come back and I'll help you checkout!",
                ))
            }
        };

        let mut items = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let product = self.store.find_product(item.product_id).await?;
            let (name, brand) = match &product {
                Some(p) => (p.name.clone(), Some(p.brand.clone())),
                None => ("Unknown item".to_string(), None),
            };
            items.push(OrderItem::new(
                item.product_id,
                &name,
                brand.as_deref(),
                item.quantity,
                &item.size,
                &item.color,
                item.price,
            ));
        }

        let shipping = ShippingAddress {
            full_name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            phone: Some(user.phone.clone().unwrap_or_else(|| "Not provided".to_string())),
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip_code: address.zip_code.clone(),
            country: address
                .country
                .clone()
                .unwrap_or_else(|| "Bangladesh".to_string()),
        };

        // Conversational checkout is cash on delivery and confirms right away.
        let mut order = Order::new(
            user_id,
            items,
            cart.total_amount,
            shipping,
            PaymentMethod::Cash,
        );
        order.status = OrderStatus::Confirmed;

        let item_count: u32 = order.items.iter().map(|i| i.quantity).sum();
        let order_number = order.order_number.clone();
        let total = order.total_amount;

        self.store.insert_order(&order).await?;
        cart.clear();
        self.store.save_cart(&cart).await?;

        let response = format!(
            "🎉 Order placed successfully!\n\n**Order Number:** {order_number}\n\
             **Items:** {item_count}\n**Total:** ${total:.2}\n**Payment:** Cash on \
             Delivery\n**Estimated Delivery:** 7 days from now\n\nThank you for \
             shopping with ShoeBot!"
        );

        Ok(ChatReply {
            response,
            intent: Intent::Checkout,
            entities: entities.clone(),
            products: None,
            cart_updated: true,
        })
    }

    async fn product_label(&self, product_id: Uuid) -> Result<(String, String)> {
        Ok(self
            .store
            .find_product(product_id)
            .await?
            .map(|p| (p.name, p.brand))
            .unwrap_or_else(|| ("Unknown item".to_string(), "Unknown".to_string())))
    }
}
