pub struct Prompts;

impl Prompts {
    pub const INTENT_SYSTEM: &'static str = "You are an expert at analyzing user intents for an e-commerce shoe store. Always respond with valid JSON only.";

    pub const INQUIRY_SYSTEM: &'static str = "You are a helpful customer service assistant for ShoeBot, an online shoe store. Be friendly, helpful, and informative.";

    pub fn intent_analysis(message: &str, context: &str) -> String {
        format!(
            r#"
You are an AI assistant for a shoe e-commerce store. Analyze the user's message and determine their intent.

Available intents:
1. "browse_products" - User wants to see/search for shoes (e.g., "show me running shoes", "I need boots")
2. "add_to_cart" - User wants to add a specific shoe to cart (e.g., "add red sneakers size 9", "I want the Nike Air Max")
3. "remove_from_cart" - User wants to remove items from cart (e.g., "remove the boots", "delete size 8 sneakers")
4. "view_cart" - User wants to see their cart contents (e.g., "show my cart", "what's in my cart")
5. "checkout" - User wants to complete purchase (e.g., "checkout", "I'm ready to buy", "place order")
6. "general_inquiry" - General questions about products, shipping, etc.
7. "greeting" - User is greeting or starting conversation
8. "unknown" - Cannot determine intent

Extract entities when relevant:
- productName: specific shoe name, brand, or model mentioned (e.g., "Arizona", "Nike Air Max", "Converse", "Birkenstock")
- category: type of shoe (sneakers, boots, sandals, formal, sports, casual)
- size: shoe size mentioned (e.g., "9", "10.5", "size 8")
- color: color mentioned (e.g., "black", "red", "white")
- quantity: number of items (default to 1 if not specified)

Important: For productName, extract ANY shoe-related name, brand, or model mentioned, even partial names like "Arizona" (which refers to Birkenstock Arizona sandals).

Context from previous messages:
{context}

Current user message: "{message}"

Respond with a JSON object containing:
{{
  "intent": "intent_name",
  "entities": {{
    "productName": "extracted product name or null",
    "category": "extracted category or null",
    "size": "extracted size or null",
    "color": "extracted color or null",
    "quantity": extracted_number_or_null
  }},
  "confidence": confidence_score_0_to_1
}}"#
        )
    }

    pub fn general_inquiry(message: &str) -> String {
        format!(
            r#"
You are a helpful customer service assistant for a shoe e-commerce store. Answer the user's question about shoes, shipping, returns, sizing, or general store policies. Keep responses friendly, helpful, and concise.

User question: "{message}"

Provide a helpful response about shoes, shopping, or store policies."#
        )
    }
}
